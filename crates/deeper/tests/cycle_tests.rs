use deeper::{Cloner, Mapping, Pointer, Sequence, Value};
use deeper_test_utils::{break_cycle, break_ring, next_node, ring, self_loop};

#[test]
fn test_self_referential_pointer() {
    let cloner = Cloner::new();
    let original = self_loop();

    let cloned = cloner.clone_value(&original.clone().into()).unwrap();
    let cloned = cloned.as_pointer().unwrap().clone();
    let referent = cloned.get().unwrap().as_pointer().unwrap().clone();

    assert!(referent.ptr_eq(&cloned));
    assert!(!cloned.ptr_eq(&original));

    break_cycle(&original);
    break_cycle(&cloned);
}

#[test]
fn test_ring_topology_preserved() {
    let cloner = Cloner::new();
    let original = ring(3);

    let cloned = cloner.clone_value(&original.clone().into()).unwrap();
    let head = cloned.as_pointer().unwrap().clone();
    let second = next_node(&head);
    let third = next_node(&second);

    assert!(next_node(&third).ptr_eq(&head));
    assert!(!head.ptr_eq(&second) && !second.ptr_eq(&third));
    assert!(Value::from(head.clone()).deep_eq(&original.clone().into()));

    break_ring(&original, 3);
    break_ring(&head, 3);
}

#[test]
fn test_sequence_containing_itself() {
    let cloner = Cloner::new();
    let original = Sequence::new(vec![Value::Int(1)]);
    original.push(original.clone().into()).unwrap();

    let cloned = cloner.clone_value(&original.clone().into()).unwrap();
    let cloned = cloned.as_sequence().unwrap().clone();

    assert_eq!(cloned.len(), 2);
    assert_eq!(cloned.get(0).unwrap(), Value::Int(1));
    assert!(cloned.get(1).unwrap().as_sequence().unwrap().ptr_eq(&cloned));

    original.set(1, Value::Nil).unwrap();
    cloned.set(1, Value::Nil).unwrap();
}

#[test]
fn test_mapping_containing_itself() {
    let cloner = Cloner::new();
    let original = Mapping::new();
    original.insert(Value::str("self"), original.clone().into()).unwrap();

    let cloned = cloner.clone_value(&original.clone().into()).unwrap();
    let cloned = cloned.as_mapping().unwrap().clone();
    let inner = cloned.get(&Value::str("self")).unwrap().unwrap();

    assert!(inner.as_mapping().unwrap().ptr_eq(&cloned));
    assert!(!cloned.ptr_eq(&original));

    original.insert(Value::str("self"), Value::Nil).unwrap();
    cloned.insert(Value::str("self"), Value::Nil).unwrap();
}

#[test]
fn test_cycle_through_mixed_kinds() {
    // pointer -> sequence -> mapping -> pointer
    let cloner = Cloner::new();
    let ptr = Pointer::new(Value::Nil);
    let map = Mapping::from_entries([(Value::str("back"), Value::from(ptr.clone()))]);
    let seq = Sequence::new(vec![map.into()]);
    ptr.set(seq.into()).unwrap();

    let cloned = cloner.clone_value(&ptr.clone().into()).unwrap();
    let cloned_ptr = cloned.as_pointer().unwrap().clone();

    let cloned_seq = cloned_ptr.get().unwrap().as_sequence().unwrap().clone();
    let cloned_map = cloned_seq.get(0).unwrap().as_mapping().unwrap().clone();
    let back = cloned_map.get(&Value::str("back")).unwrap().unwrap();
    assert!(back.as_pointer().unwrap().ptr_eq(&cloned_ptr));

    break_cycle(&ptr);
    break_cycle(&cloned_ptr);
}

#[test]
fn test_shared_subgraph_cloned_once() {
    let cloner = Cloner::new();
    let shared = Sequence::new(vec![Value::Int(1), Value::Int(2)]);
    let original = Value::map([
        (Value::str("left"), Value::from(shared.clone())),
        (Value::str("right"), Value::from(shared)),
    ]);

    let cloned = cloner.clone_value(&original).unwrap();
    let map = cloned.as_mapping().unwrap();
    let left = map.get(&Value::str("left")).unwrap().unwrap();
    let right = map.get(&Value::str("right")).unwrap().unwrap();

    assert_eq!(left, right);
    left.as_sequence().unwrap().push(Value::Int(3)).unwrap();
    assert_eq!(right.as_sequence().unwrap().len(), 3);
}

#[test]
fn test_long_ring_terminates() {
    let cloner = Cloner::new();
    let original = ring(100);

    let cloned = cloner.clone_value(&original.clone().into()).unwrap();
    let head = cloned.as_pointer().unwrap().clone();

    let mut current = head.clone();
    for _ in 0..100 {
        current = next_node(&current);
    }
    assert!(current.ptr_eq(&head));

    break_ring(&original, 100);
    break_ring(&head, 100);
}
