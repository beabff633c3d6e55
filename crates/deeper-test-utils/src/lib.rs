//! Testing utilities for deeper workspace
//!
//! Shared graph fixtures and object types.

#![allow(missing_docs)]

use deeper::{
    CloneResult, CloneSession, Cloneable, FieldDef, Object, ObjectType, Pointer, Record,
    RecordType, Value,
};
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

/// Pointer to an integer
pub fn int_ref(value: i64) -> Pointer {
    Pointer::new(Value::Int(value))
}

/// Integer behind `value`, panicking on other shapes
pub fn read_int(value: &Value) -> i64 {
    let ptr = value.as_pointer().expect("expected a reference");
    let referent = ptr.get().expect("referent borrowed");
    referent.as_int().expect("expected an int referent")
}

/// Writable field with a storage-free zero value
pub fn field(name: &str, zero: Value) -> FieldDef {
    FieldDef::writable(name)
        .with_zero(zero)
        .expect("storage-free zero value")
}

/// Record type `Pair { a: int, b: ref }`
pub fn pair_type() -> Rc<RecordType> {
    RecordType::new(
        "Pair",
        vec![
            field("a", Value::Int(0)),
            field("b", Value::Ref(None)),
        ],
    )
}

/// Record type `Twin { a: ref, b: ref }`
pub fn twin_type() -> Rc<RecordType> {
    RecordType::new(
        "Twin",
        vec![
            field("a", Value::Ref(None)),
            field("b", Value::Ref(None)),
        ],
    )
}

/// `Twin` record with the given fields
pub fn twin(a: Pointer, b: Pointer) -> Record {
    Record::new(twin_type(), vec![a.into(), b.into()]).expect("twin arity")
}

/// Record type `Node { value: int, next: ref }`
pub fn node_type() -> Rc<RecordType> {
    RecordType::new(
        "Node",
        vec![
            field("value", Value::Int(0)),
            field("next", Value::Ref(None)),
        ],
    )
}

/// Ring of `len` nodes; returns the pointer to node 0
pub fn ring(len: usize) -> Pointer {
    let ty = node_type();
    let nodes: Vec<Pointer> = (0..len).map(|_| Pointer::new(Value::Nil)).collect();
    for (i, node) in nodes.iter().enumerate() {
        let next = nodes[(i + 1) % len].clone();
        let record = Record::new(ty.clone(), vec![Value::Int(i as i64), next.into()])
            .expect("node arity");
        node.set(record.into()).expect("fresh node");
    }
    nodes[0].clone()
}

/// Pointer whose referent is itself
pub fn self_loop() -> Pointer {
    let ptr = Pointer::new(Value::Nil);
    ptr.set(ptr.clone().into()).expect("fresh pointer");
    ptr
}

/// Break a cycle through `ptr` so its storage can be freed
pub fn break_cycle(ptr: &Pointer) {
    let _ = ptr.set(Value::Nil);
}

/// Follow `next` links of a ring node
pub fn next_node(node: &Pointer) -> Pointer {
    let record = node.get().expect("node borrowed");
    let next = record
        .as_record()
        .and_then(|r| r.get("next"))
        .and_then(Value::as_pointer)
        .cloned();
    next.expect("node has next")
}

/// Break every link of a ring built by [`ring`]
pub fn break_ring(head: &Pointer, len: usize) {
    let mut nodes = Vec::with_capacity(len);
    let mut current = head.clone();
    for _ in 0..len {
        let next = next_node(&current);
        nodes.push(current);
        current = next;
    }
    for node in &nodes {
        break_cycle(node);
    }
}

/// Self-cloning object that counts how often it was cloned
#[derive(Debug)]
pub struct Counter {
    pub label: String,
    pub payload: Value,
    pub clones: Rc<Cell<usize>>,
}

impl Counter {
    /// Counter with zero recorded clones
    pub fn new(label: &str, payload: Value) -> Self {
        Self {
            label: label.to_string(),
            payload,
            clones: Rc::new(Cell::new(0)),
        }
    }
}

impl ObjectType for Counter {
    fn type_name(&self) -> &str {
        "Counter"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_cloneable(&self) -> Option<&dyn Cloneable> {
        Some(self)
    }

    fn object_eq(&self, other: &dyn ObjectType) -> bool {
        other
            .as_any()
            .downcast_ref::<Counter>()
            .is_some_and(|other| other.label == self.label && other.payload.deep_eq(&self.payload))
    }
}

impl Cloneable for Counter {
    fn clone_with(&self, session: &mut CloneSession<'_>) -> CloneResult<Value> {
        self.clones.set(self.clones.get() + 1);
        let payload = session.clone_value(&self.payload)?;
        Ok(Value::Object(Object::new(Counter {
            label: self.label.clone(),
            payload,
            clones: Rc::clone(&self.clones),
        })))
    }
}

/// Object with no cloning hook
#[derive(Debug)]
pub struct Opaque(pub u32);

impl ObjectType for Opaque {
    fn type_name(&self) -> &str {
        "Opaque"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
