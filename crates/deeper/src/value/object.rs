//! Opaque objects, callables and channels

use super::handle::{Identity, RefKind};
use super::Value;
use crate::protocol::Cloneable;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A Rust type carried inside the value graph
///
/// Objects are opaque to the structural cloners. A type takes control of its
/// own cloning by returning itself from [`ObjectType::as_cloneable`];
/// otherwise an extension cloner registered for [`TypeKey::object`] is used,
/// and failing both the object is shared as-is.
///
/// [`TypeKey::object`]: super::TypeKey::object
pub trait ObjectType: Any + fmt::Debug {
    /// Display name used in diagnostics and errors
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;

    /// Self-cloning capability
    fn as_cloneable(&self) -> Option<&dyn Cloneable> {
        None
    }

    /// Structural comparison with another object, used by [`Value::deep_eq`]
    fn object_eq(&self, _other: &dyn ObjectType) -> bool {
        false
    }
}

/// Shared handle to an [`ObjectType`]
#[derive(Clone)]
pub struct Object {
    inner: Rc<dyn ObjectType>,
    type_id: TypeId,
}

impl Object {
    /// Wrap a Rust value
    #[must_use]
    pub fn new<T: ObjectType>(value: T) -> Self {
        Self {
            inner: Rc::new(value),
            type_id: TypeId::of::<T>(),
        }
    }

    /// `TypeId` of the wrapped Rust type
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name reported by the object type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    /// Borrow the wrapped value as `T`
    #[must_use]
    pub fn downcast_ref<T: ObjectType>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Self-cloning hook, if the type provides one
    #[inline]
    #[must_use]
    pub fn as_cloneable(&self) -> Option<&dyn Cloneable> {
        self.inner.as_cloneable()
    }

    /// Identity of the shared allocation
    #[inline]
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(RefKind::Object, Rc::as_ptr(&self.inner).cast::<()>() as usize)
    }

    /// Whether both handles share one allocation
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }

    pub(crate) fn object_eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.object_eq(other.inner.as_ref())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Object").field(&self.inner).finish()
    }
}

type Callable = dyn Fn(&[Value]) -> Value;

/// Callable value
#[derive(Clone)]
pub struct Func {
    name: Rc<str>,
    call: Rc<Callable>,
}

impl Func {
    /// Named callable
    pub fn new(name: &str, call: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self {
            name: Rc::from(name),
            call: Rc::new(call),
        }
    }

    /// Name given at construction
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callable
    pub fn call(&self, args: &[Value]) -> Value {
        (self.call)(args)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.call).cast::<()>() as usize
    }

    /// Whether both handles share one callable
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Func({})", self.name)
    }
}

/// Single-threaded FIFO channel of values
#[derive(Clone)]
pub struct Channel {
    elem: Rc<str>,
    queue: Rc<RefCell<VecDeque<Value>>>,
}

impl Channel {
    /// Channel carrying values described by `elem`
    #[must_use]
    pub fn new(elem: &str) -> Self {
        Self {
            elem: Rc::from(elem),
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Element type name
    #[inline]
    #[must_use]
    pub fn elem(&self) -> &str {
        &self.elem
    }

    /// Queue a value
    pub fn send(&self, value: Value) {
        self.queue.borrow_mut().push_back(value);
    }

    /// Take the oldest queued value
    pub fn recv(&self) -> Option<Value> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of queued values
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.queue) as usize
    }

    /// Whether both handles share one queue
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.queue, &other.queue)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channel({}, len={})", self.elem, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Token(u32);

    impl ObjectType for Token {
        fn type_name(&self) -> &str {
            "Token"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn object_downcast_and_identity() {
        let object = Object::new(Token(5));
        assert_eq!(object.downcast_ref::<Token>().map(|t| t.0), Some(5));
        assert_eq!(object.type_id(), TypeId::of::<Token>());
        assert!(object.ptr_eq(&object.clone()));
        assert!(!object.ptr_eq(&Object::new(Token(5))));
        assert!(object.as_cloneable().is_none());
    }

    #[test]
    fn func_call() {
        let double = Func::new("double", |args| match args.first() {
            Some(Value::Int(v)) => Value::Int(v * 2),
            _ => Value::Nil,
        });
        assert_eq!(double.call(&[Value::Int(4)]), Value::Int(8));
        assert!(double.ptr_eq(&double.clone()));
    }

    #[test]
    fn channel_fifo() {
        let chan = Channel::new("int");
        chan.send(Value::Int(1));
        chan.send(Value::Int(2));
        assert_eq!(chan.len(), 2);
        assert_eq!(chan.recv(), Some(Value::Int(1)));
        assert_eq!(chan.recv(), Some(Value::Int(2)));
        assert!(chan.is_empty());
    }
}
