//! Shared reference handles
//!
//! [`Pointer`], [`Sequence`] and [`Mapping`] wrap `Rc<RefCell<_>>`. Cloning a
//! handle with [`Clone`] shares the storage; the clone engine is what produces
//! independent storage.

use super::{Value, ValueError};
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Kind of storage an [`Identity`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefKind {
    Pointer,
    Sequence,
    Mapping,
    Object,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pointer => "pointer",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Storage identity of a shared handle
///
/// Two handles have the same identity iff they share one allocation. The
/// address is only meaningful while some handle keeps the allocation alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity {
    kind: RefKind,
    addr: usize,
}

impl Identity {
    #[inline]
    pub(crate) fn new(kind: RefKind, addr: usize) -> Self {
        Self { kind, addr }
    }

    /// Kind of storage
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RefKind {
        self.kind
    }

    /// Allocation address
    #[inline]
    #[must_use]
    pub fn addr(&self) -> usize {
        self.addr
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.kind, self.addr)
    }
}

/// Shared, mutable reference to a single value
#[derive(Clone)]
pub struct Pointer(Rc<RefCell<Value>>);

impl Pointer {
    /// Allocate new storage holding `value`
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Borrow the referent
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] while the referent is being replaced
    pub fn get(&self) -> Result<Ref<'_, Value>, ValueError> {
        self.0.try_borrow().map_err(|_| ValueError::Borrowed {
            kind: RefKind::Pointer,
        })
    }

    /// Replace the referent, returning the previous value
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] if the referent is currently borrowed
    pub fn set(&self, value: Value) -> Result<Value, ValueError> {
        let mut slot = self.0.try_borrow_mut().map_err(|_| ValueError::Borrowed {
            kind: RefKind::Pointer,
        })?;
        Ok(std::mem::replace(&mut *slot, value))
    }

    /// Identity of the shared referent storage
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(RefKind::Pointer, Rc::as_ptr(&self.0) as usize)
    }

    /// Whether both handles share storage
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// Referents may loop back to the pointer, so only the address is printed.
impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({:#x})", self.identity().addr())
    }
}

/// Shared, growable sequence of values
#[derive(Clone)]
pub struct Sequence(Rc<RefCell<Vec<Value>>>);

impl Sequence {
    /// Sequence over `items`
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    /// Empty sequence with reserved capacity
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Vec::with_capacity(capacity))
    }

    /// Borrow the backing buffer
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] while the buffer is being mutated
    pub fn borrow(&self) -> Result<Ref<'_, Vec<Value>>, ValueError> {
        self.0.try_borrow().map_err(|_| ValueError::Borrowed {
            kind: RefKind::Sequence,
        })
    }

    fn borrow_mut(&self) -> Result<std::cell::RefMut<'_, Vec<Value>>, ValueError> {
        self.0.try_borrow_mut().map_err(|_| ValueError::Borrowed {
            kind: RefKind::Sequence,
        })
    }

    /// Shallow copy of the element at `index`
    ///
    /// # Errors
    /// Returns [`ValueError::OutOfBounds`] or [`ValueError::Borrowed`]
    pub fn get(&self, index: usize) -> Result<Value, ValueError> {
        let items = self.borrow()?;
        items.get(index).cloned().ok_or(ValueError::OutOfBounds {
            index,
            len: items.len(),
        })
    }

    /// Replace the element at `index`, returning the previous one
    ///
    /// # Errors
    /// Returns [`ValueError::OutOfBounds`] or [`ValueError::Borrowed`]
    pub fn set(&self, index: usize, value: Value) -> Result<Value, ValueError> {
        let mut items = self.borrow_mut()?;
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(ValueError::OutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    /// Append an element
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] if the buffer is borrowed
    pub fn push(&self, value: Value) -> Result<(), ValueError> {
        self.borrow_mut()?.push(value);
        Ok(())
    }

    /// Number of elements, or 0 while mutably borrowed
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow().map(|items| items.len()).unwrap_or(0)
    }

    /// Whether the sequence has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserved capacity of the backing buffer
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.borrow().map(|items| items.capacity()).unwrap_or(0)
    }

    /// Identity of the backing buffer
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(RefKind::Sequence, Rc::as_ptr(&self.0) as usize)
    }

    /// Whether both handles share one buffer
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence({:#x}, len={})", self.identity().addr(), self.len())
    }
}

/// Shared key/value mapping
///
/// Iteration order is unspecified.
#[derive(Clone)]
pub struct Mapping(Rc<RefCell<HashMap<Value, Value>>>);

impl Mapping {
    /// Create empty mapping
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create empty mapping sized for `capacity` entries
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Rc::new(RefCell::new(HashMap::with_capacity(capacity))))
    }

    /// Mapping from key/value pairs; later duplicates win
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// Borrow the entries
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] while the mapping is being mutated
    pub fn borrow(&self) -> Result<Ref<'_, HashMap<Value, Value>>, ValueError> {
        self.0.try_borrow().map_err(|_| ValueError::Borrowed {
            kind: RefKind::Mapping,
        })
    }

    /// Shallow copy of the value stored under `key`
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] while the mapping is being mutated
    pub fn get(&self, key: &Value) -> Result<Option<Value>, ValueError> {
        Ok(self.borrow()?.get(key).cloned())
    }

    /// Insert an entry, returning the previous value for `key`
    ///
    /// # Errors
    /// Returns [`ValueError::Borrowed`] if the mapping is borrowed
    pub fn insert(&self, key: Value, value: Value) -> Result<Option<Value>, ValueError> {
        let mut entries = self.0.try_borrow_mut().map_err(|_| ValueError::Borrowed {
            kind: RefKind::Mapping,
        })?;
        Ok(entries.insert(key, value))
    }

    /// Number of entries, or 0 while mutably borrowed
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether the mapping has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the backing table
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(RefKind::Mapping, Rc::as_ptr(&self.0) as usize)
    }

    /// Whether both handles share one table
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mapping({:#x}, len={})", self.identity().addr(), self.len())
    }
}
