//! Integration tests for persistent collections
//!
//! Tests LtVec and LtMap with structural sharing and immutability.

use shadowdb_foundation::Value;
use shadowdb_foundation::collections::{LtMap, LtVec, MAX_PADDING};
use std::sync::Arc;

// =============================================================================
// LtVec
// =============================================================================

#[test]
fn vector_empty() {
    let v: LtVec<Value> = LtVec::new();
    assert!(v.is_empty());
    assert_eq!(v.len(), 0);
}

#[test]
fn vector_push_back_leaves_original() {
    let v = LtVec::new().push_back(Value::Int(1));
    let v2 = v.push_back(Value::Int(2));

    assert_eq!(v.len(), 1);
    assert_eq!(v2.len(), 2);
    assert_eq!(v2.get(1), Some(&Value::Int(2)));
}

#[test]
fn vector_update_out_of_range() {
    let v: LtVec<i32> = [1, 2].into_iter().collect();
    assert!(v.update(5, 9).is_none());
    assert_eq!(v.update(0, 9).unwrap().get(0), Some(&9));
}

#[test]
fn vector_set_padded_fills_gap() {
    let v: LtVec<i32> = LtVec::new();
    let v = v.set_padded(3, 7, &0).unwrap();
    assert_eq!(v.iter().copied().collect::<Vec<_>>(), vec![0, 0, 0, 7]);
}

#[test]
fn vector_set_padded_refuses_huge_gap() {
    let v: LtVec<i32> = LtVec::new();
    assert!(v.set_padded(MAX_PADDING + 1, 7, &0).is_none());
    assert!(v.set_padded(MAX_PADDING, 7, &0).is_some());
}

// =============================================================================
// LtMap
// =============================================================================

#[test]
fn map_insert_leaves_original() {
    let m: LtMap<Arc<str>, Value> = LtMap::new();
    let m2 = m.insert("hp".into(), Value::Int(3));

    assert!(m.is_empty());
    assert_eq!(m2.get("hp"), Some(&Value::Int(3)));
    assert!(m2.contains_key("hp"));
}

#[test]
fn map_remove() {
    let m: LtMap<Arc<str>, i32> = [("a".into(), 1), ("b".into(), 2)].into_iter().collect();
    let m2 = m.remove("a");

    assert_eq!(m.len(), 2);
    assert_eq!(m2.len(), 1);
    assert!(!m2.contains_key("a"));
}

#[test]
fn map_iterates_in_key_order() {
    let m: LtMap<Arc<str>, i32> = [("b".into(), 2), ("a".into(), 1)].into_iter().collect();
    let keys: Vec<&str> = m.keys().map(|k| &**k).collect();
    assert_eq!(keys, vec!["a", "b"]);
}
