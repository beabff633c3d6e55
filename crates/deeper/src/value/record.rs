//! Records and polymorphic containers
//!
//! A [`Record`] is an instance of a [`RecordType`]. Each field carries
//! a [`FieldAccess`] capability: the clone engine only writes fields that are
//! [`FieldAccess::Writable`] and leaves the rest at their zero value.

use super::{Value, ValueError};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Whether a field may be written from outside the record's owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldAccess {
    /// Exposed for external mutation; deep-cloned
    #[default]
    Writable,

    /// Owner-private; left at its zero value by the clone engine
    ReadOnly,
}

/// Field descriptor
#[derive(Debug, Clone)]
pub struct FieldDef {
    name: Rc<str>,
    access: FieldAccess,
    zero: Value,
}

impl FieldDef {
    /// Writable field with a `Nil` zero value
    #[must_use]
    pub fn writable(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            access: FieldAccess::Writable,
            zero: Value::Nil,
        }
    }

    /// Read-only field with a `Nil` zero value
    #[must_use]
    pub fn read_only(name: &str) -> Self {
        Self {
            access: FieldAccess::ReadOnly,
            ..Self::writable(name)
        }
    }

    /// Set the zero value a fresh record starts with
    ///
    /// Every zeroed record and every clone's read-only field gets a copy of
    /// this value, so it must not hold shared storage.
    ///
    /// # Errors
    /// Returns [`ValueError::SharedZero`] unless
    /// [`Value::is_storage_free`] holds for `zero`
    pub fn with_zero(mut self, zero: Value) -> Result<Self, ValueError> {
        if !zero.is_storage_free() {
            return Err(ValueError::SharedZero {
                field: self.name.to_string(),
                shape: zero.shape(),
            });
        }
        self.zero = zero;
        Ok(self)
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write capability
    #[inline]
    #[must_use]
    pub fn access(&self) -> FieldAccess {
        self.access
    }

    /// Capability check used by the clone engine
    #[inline]
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.access == FieldAccess::Writable
    }

    /// Value a fresh record starts with
    #[inline]
    #[must_use]
    pub fn zero(&self) -> &Value {
        &self.zero
    }
}

/// Record type identity: the type name plus its field layout
///
/// Two record types with the same name but different fields get different
/// keys, so an extension cloner registered for one never sees the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    name: Rc<str>,
    fields: Rc<[Rc<str>]>,
}

impl RecordKey {
    /// Record type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| &**field)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {} }}", self.name, self.fields.join(", "))
    }
}

/// Record type with named fields
#[derive(Debug)]
pub struct RecordType {
    key: RecordKey,
    fields: Vec<FieldDef>,
}

impl RecordType {
    /// Declare a record type
    #[must_use]
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Rc<Self> {
        let key = RecordKey {
            name: Rc::from(name),
            fields: fields.iter().map(|field| Rc::clone(&field.name)).collect(),
        };
        Rc::new(Self { key, fields })
    }

    /// Record type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Key under which extension cloners for this type are registered
    #[inline]
    #[must_use]
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// Field descriptors in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Position of the named field
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the type declares no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Record instance with value semantics
#[derive(Debug, Clone)]
pub struct Record {
    ty: Rc<RecordType>,
    values: Vec<Value>,
}

impl Record {
    /// Record with every field at its zero value
    #[must_use]
    pub fn zeroed(ty: Rc<RecordType>) -> Self {
        let values = ty.fields().iter().map(|f| f.zero().clone()).collect();
        Self { ty, values }
    }

    /// Record from positional field values
    ///
    /// # Errors
    /// Returns [`ValueError::FieldCount`] if `values` does not match the type
    pub fn new(ty: Rc<RecordType>, values: Vec<Value>) -> Result<Self, ValueError> {
        if values.len() != ty.len() {
            return Err(ValueError::FieldCount {
                record: ty.name().to_string(),
                expected: ty.len(),
                actual: values.len(),
            });
        }
        Ok(Self { ty, values })
    }

    /// Type this record is an instance of
    #[inline]
    #[must_use]
    pub fn record_type(&self) -> &Rc<RecordType> {
        &self.ty
    }

    /// Name of the record type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Field value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.ty.field_index(name).and_then(|i| self.values.get(i))
    }

    /// Field value by position
    #[inline]
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Set a field by name, returning the previous value
    ///
    /// # Errors
    /// Returns [`ValueError::UnknownField`] for undeclared names
    pub fn set(&mut self, name: &str, value: Value) -> Result<Value, ValueError> {
        let index = self
            .ty
            .field_index(name)
            .ok_or_else(|| ValueError::UnknownField {
                record: self.ty.name().to_string(),
                field: name.to_string(),
            })?;
        self.set_field(index, value)
    }

    /// Set a field by position, returning the previous value
    ///
    /// # Errors
    /// Returns [`ValueError::FieldIndex`] for out-of-range positions
    pub fn set_field(&mut self, index: usize, value: Value) -> Result<Value, ValueError> {
        let record = self.ty.name().to_string();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(ValueError::FieldIndex { record, index })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Field descriptors paired with their values
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDef, &Value)> {
        self.ty.fields().iter().zip(self.values.iter())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ty.key() == other.ty.key() && self.values == other.values
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.key().hash(state);
        self.values.hash(state);
    }
}

/// Polymorphic container: a named static type holding one concrete value
///
/// An empty container is absent.
#[derive(Debug, Clone)]
pub struct Dyn {
    container: Rc<str>,
    inner: Option<Box<Value>>,
}

impl Dyn {
    /// Wrap `value`; wrapping `Nil` yields an absent container
    #[must_use]
    pub fn new(container: &str, value: Value) -> Self {
        Self::wrap(Rc::from(container), value)
    }

    /// Absent container
    #[must_use]
    pub fn absent(container: &str) -> Self {
        Self {
            container: Rc::from(container),
            inner: None,
        }
    }

    pub(crate) fn wrap(container: Rc<str>, value: Value) -> Self {
        let inner = (!value.is_nil()).then(|| Box::new(value));
        Self { container, inner }
    }

    /// Re-wrap a value into a container of the same static type
    #[must_use]
    pub fn rewrap(&self, value: Value) -> Self {
        Self::wrap(self.container_rc(), value)
    }

    /// Static container name
    #[inline]
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    pub(crate) fn container_rc(&self) -> Rc<str> {
        Rc::clone(&self.container)
    }

    /// Concrete value, if present
    #[inline]
    #[must_use]
    pub fn inner(&self) -> Option<&Value> {
        self.inner.as_deref()
    }
}

impl PartialEq for Dyn {
    fn eq(&self, other: &Self) -> bool {
        self.container == other.container && self.inner == other.inner
    }
}

impl Eq for Dyn {}

impl Hash for Dyn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.container.hash(state);
        self.inner.hash(state);
    }
}
