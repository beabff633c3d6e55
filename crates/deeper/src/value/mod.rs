//! Dynamic value model
//!
//! Provides [`Value`], the closed set of shapes the clone engine knows how to
//! traverse. Reference-typed variants ([`Pointer`], [`Sequence`], [`Mapping`])
//! are shared, interior-mutable handles whose storage address is their
//! identity.
//!
//! `==` on [`Value`] is *key* equality: scalars compare by value, handles by
//! identity. Use [`Value::deep_eq`] for structural comparison of graphs.

// Handles hash by identity, so interior mutability never changes a key's hash.
#![allow(clippy::mutable_key_type)]

mod eq;
mod handle;
mod object;
mod record;

pub use handle::{Identity, Mapping, Pointer, RefKind, Sequence};
pub use object::{Channel, Func, Object, ObjectType};
pub use record::{Dyn, FieldAccess, FieldDef, Record, RecordKey, RecordType};

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Errors raised by value handles and records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// A handle is already mutably borrowed
    #[error("{kind} is already mutably borrowed")]
    Borrowed {
        /// Kind of handle that was busy
        kind: RefKind,
    },

    /// Record has no field with that name
    #[error("record {record} has no field named '{field}'")]
    UnknownField {
        /// Record type name
        record: String,
        /// Requested field
        field: String,
    },

    /// Record field index out of range
    #[error("record {record} has no field at index {index}")]
    FieldIndex {
        /// Record type name
        record: String,
        /// Requested index
        index: usize,
    },

    /// Wrong number of field values for a record type
    #[error("record {record} expects {expected} fields, got {actual}")]
    FieldCount {
        /// Record type name
        record: String,
        /// Declared field count
        expected: usize,
        /// Supplied value count
        actual: usize,
    },

    /// Field zero value holds shared storage
    #[error("zero value of field '{field}' holds {shape} storage that every record would share")]
    SharedZero {
        /// Field name
        field: String,
        /// Shape of the offending value
        shape: Shape,
    },

    /// Sequence index out of range
    #[error("index {index} out of bounds for sequence of length {len}")]
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Sequence length
        len: usize,
    },
}

/// Structural classification of a value
///
/// Drives dispatch in the clone engine and tags diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    /// Single shared reference
    Reference,

    /// Growable sequence with its own backing buffer
    Sequence,

    /// Fixed-size array with value semantics
    Array,

    /// Key/value mapping
    Mapping,

    /// Record with named fields
    Record,

    /// Polymorphic container holding one concrete value
    Polymorphic,

    /// Scalar or opaque value without traversable references
    Scalar,

    /// Callable or channel value, rejected by the engine
    Unclonable,
}

impl Shape {
    /// Stable lowercase tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Sequence => "sequence",
            Self::Array => "array",
            Self::Mapping => "mapping",
            Self::Record => "record",
            Self::Polymorphic => "dyn",
            Self::Scalar => "scalar",
            Self::Unclonable => "unclonable",
        }
    }

    /// Whether values of this shape carry a storage identity
    #[inline]
    #[must_use]
    pub fn has_identity(&self) -> bool {
        matches!(self, Self::Reference | Self::Sequence | Self::Mapping)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact dynamic type of a value, used to key extension cloners
///
/// Record types are keyed by name and field layout. Polymorphic containers
/// are nominal: two containers with the same name share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Nil,
    Bool,
    Int,
    Uint,
    Float,
    Char,
    Str,
    Ref,
    Seq,
    Array,
    Map,
    /// Record type by name and field layout
    Record(RecordKey),
    /// Polymorphic container type by name
    Dyn(Rc<str>),
    /// Rust type behind an [`Object`]
    Object(TypeId),
    Func,
    Chan,
}

impl TypeKey {
    /// Key for a record type
    #[must_use]
    pub fn record(ty: &RecordType) -> Self {
        Self::Record(ty.key().clone())
    }

    /// Key for a polymorphic container name
    #[must_use]
    pub fn dyn_container(name: &str) -> Self {
        Self::Dyn(Rc::from(name))
    }

    /// Key for an object type
    #[must_use]
    pub fn object<T: ObjectType>() -> Self {
        Self::Object(TypeId::of::<T>())
    }
}

/// A dynamically shaped value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Untyped absent value
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    /// Immutable string, shared on copy
    Str(Rc<str>),
    /// Reference; `None` is an absent reference
    Ref(Option<Pointer>),
    /// Dynamic sequence; `None` is an absent sequence
    Seq(Option<Sequence>),
    /// Fixed-size array
    Array(Box<[Value]>),
    /// Mapping; `None` is an absent mapping
    Map(Option<Mapping>),
    Record(Record),
    Dyn(Dyn),
    Object(Object),
    Func(Func),
    Chan(Channel),
}

impl Value {
    /// String value
    #[must_use]
    pub fn str(s: &str) -> Self {
        Self::Str(Rc::from(s))
    }

    /// New reference to `value`
    #[must_use]
    pub fn reference(value: Value) -> Self {
        Self::Ref(Some(Pointer::new(value)))
    }

    /// New sequence holding `items`
    #[must_use]
    pub fn seq(items: Vec<Value>) -> Self {
        Self::Seq(Some(Sequence::new(items)))
    }

    /// New fixed array holding `items`
    #[must_use]
    pub fn array(items: Vec<Value>) -> Self {
        Self::Array(items.into_boxed_slice())
    }

    /// New mapping holding `entries`
    #[must_use]
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::Map(Some(Mapping::from_entries(entries)))
    }

    /// Structural shape of this value
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::Ref(_) => Shape::Reference,
            Self::Seq(_) => Shape::Sequence,
            Self::Array(_) => Shape::Array,
            Self::Map(_) => Shape::Mapping,
            Self::Record(_) => Shape::Record,
            Self::Dyn(_) => Shape::Polymorphic,
            Self::Func(_) | Self::Chan(_) => Shape::Unclonable,
            Self::Nil
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Uint(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::Str(_)
            | Self::Object(_) => Shape::Scalar,
        }
    }

    /// Exact dynamic type key
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::Nil => TypeKey::Nil,
            Self::Bool(_) => TypeKey::Bool,
            Self::Int(_) => TypeKey::Int,
            Self::Uint(_) => TypeKey::Uint,
            Self::Float(_) => TypeKey::Float,
            Self::Char(_) => TypeKey::Char,
            Self::Str(_) => TypeKey::Str,
            Self::Ref(_) => TypeKey::Ref,
            Self::Seq(_) => TypeKey::Seq,
            Self::Array(_) => TypeKey::Array,
            Self::Map(_) => TypeKey::Map,
            Self::Record(record) => TypeKey::Record(record.record_type().key().clone()),
            Self::Dyn(container) => TypeKey::Dyn(container.container_rc()),
            Self::Object(object) => TypeKey::Object(object.type_id()),
            Self::Func(_) => TypeKey::Func,
            Self::Chan(_) => TypeKey::Chan,
        }
    }

    /// Human-readable type name
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "str",
            Self::Ref(_) => "ref",
            Self::Seq(_) => "seq",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Record(record) => record.type_name(),
            Self::Dyn(container) => container.container(),
            Self::Object(object) => object.type_name(),
            Self::Func(func) => func.name(),
            Self::Chan(chan) => chan.elem(),
        }
    }

    /// Untyped nil
    #[inline]
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Nil, or an absent reference, sequence, mapping or polymorphic container
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Nil | Self::Ref(None) | Self::Seq(None) | Self::Map(None) => true,
            Self::Dyn(container) => container.inner().is_none(),
            _ => false,
        }
    }

    /// No part of the value lives in shared, mutable storage
    ///
    /// Scalars and absent handles qualify, as do arrays, records and
    /// containers built only from them.
    #[must_use]
    pub fn is_storage_free(&self) -> bool {
        match self {
            Self::Nil
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Uint(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::Str(_)
            | Self::Ref(None)
            | Self::Seq(None)
            | Self::Map(None) => true,
            Self::Array(items) => items.iter().all(Self::is_storage_free),
            Self::Record(record) => record.iter().all(|(_, value)| value.is_storage_free()),
            Self::Dyn(container) => container.inner().map_or(true, Self::is_storage_free),
            Self::Ref(Some(_))
            | Self::Seq(Some(_))
            | Self::Map(Some(_))
            | Self::Object(_)
            | Self::Func(_)
            | Self::Chan(_) => false,
        }
    }

    /// Storage identity, for reference-typed values that are present
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Ref(Some(ptr)) => Some(ptr.identity()),
            Self::Seq(Some(seq)) => Some(seq.identity()),
            Self::Map(Some(map)) => Some(map.identity()),
            Self::Object(object) => Some(object.identity()),
            _ => None,
        }
    }

    /// Integer payload
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Present reference
    #[must_use]
    pub fn as_pointer(&self) -> Option<&Pointer> {
        match self {
            Self::Ref(Some(ptr)) => Some(ptr),
            _ => None,
        }
    }

    /// Present sequence
    #[must_use]
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Seq(Some(seq)) => Some(seq),
            _ => None,
        }
    }

    /// Present mapping
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Map(Some(map)) => Some(map),
            _ => None,
        }
    }

    /// Record payload
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Polymorphic container payload
    #[must_use]
    pub fn as_dyn(&self) -> Option<&Dyn> {
        match self {
            Self::Dyn(container) => Some(container),
            _ => None,
        }
    }

    /// Object payload
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Structural, cycle-aware equality of two value graphs
    ///
    /// Handles compare by content; opaque objects, callables and channels by
    /// identity unless the object type supplies its own comparison.
    #[must_use]
    pub fn deep_eq(&self, other: &Value) -> bool {
        eq::DeepEq::default().eq(self, other)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => handle_eq(a.as_ref(), b.as_ref(), Pointer::ptr_eq),
            (Self::Seq(a), Self::Seq(b)) => handle_eq(a.as_ref(), b.as_ref(), Sequence::ptr_eq),
            (Self::Map(a), Self::Map(b)) => handle_eq(a.as_ref(), b.as_ref(), Mapping::ptr_eq),
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            (Self::Dyn(a), Self::Dyn(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Func(a), Self::Func(b)) => a.ptr_eq(b),
            (Self::Chan(a), Self::Chan(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

fn handle_eq<T>(a: Option<&T>, b: Option<&T>, same: fn(&T, &T) -> bool) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same(a, b),
        _ => false,
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {}
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Uint(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Char(v) => v.hash(state),
            Self::Str(v) => v.hash(state),
            Self::Array(items) => items.hash(state),
            Self::Record(record) => record.hash(state),
            Self::Dyn(container) => container.hash(state),
            Self::Ref(_) | Self::Seq(_) | Self::Map(_) | Self::Object(_) => {
                self.identity().hash(state);
            }
            Self::Func(func) => func.addr().hash(state),
            Self::Chan(chan) => chan.addr().hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::str(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<Pointer> for Value {
    fn from(v: Pointer) -> Self {
        Self::Ref(Some(v))
    }
}

impl From<Sequence> for Value {
    fn from(v: Sequence) -> Self {
        Self::Seq(Some(v))
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Self::Map(Some(v))
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<Dyn> for Value {
    fn from(v: Dyn) -> Self {
        Self::Dyn(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}
