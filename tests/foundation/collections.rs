//! Integration tests for persistent collections
//!
//! Tests StVec and StMap structural sharing and ordering.

use strata_foundation::{Key, Row, StMap, StVec, Value, row};

#[test]
fn vec_collects_values() {
    let v: StVec<Value> = [Value::Int(1), Value::from("two")].into_iter().collect();
    assert_eq!(v.len(), 2);
    assert_eq!(v.get(1), Some(&Value::from("two")));
    assert!(StVec::<Value>::new().is_empty());
}

#[test]
fn map_insert_is_persistent() {
    let a: StMap<Key, Value> = StMap::new();
    let b = a.insert(Key::from("x"), Value::Int(1));
    assert!(a.is_empty());
    assert!(b.contains_key(&Key::from("x")));
    assert!(b.remove(&Key::from("x")).is_empty());
}

#[test]
fn map_iterates_in_key_order() {
    let m: StMap<Key, Value> = [
        (Key::from("b"), Value::Int(2)),
        (Key::from(1), Value::Int(1)),
        (Key::from("a"), Value::Int(3)),
    ]
    .into_iter()
    .collect();
    let keys: Vec<String> = m.keys().map(ToString::to_string).collect();
    assert_eq!(keys, vec!["1", "a", "b"]);
}

#[test]
fn row_merge_overwrites_with_smaller_patch() {
    let stored = row([("id", Value::Int(1)), ("title", Value::from("Draft"))]);
    let patch = row([("title", "Published")]);
    let merged = stored.merge(&patch);
    assert_eq!(
        merged,
        row([("id", Value::Int(1)), ("title", Value::from("Published"))])
    );
}

#[test]
fn missing_row_defaults_to_empty() {
    let data: Option<Row> = None;
    assert!(data.unwrap_or_default().is_empty());
}

#[test]
fn row_satisfies_conditions() {
    let comment = row([("id", 3), ("post_id", 1)]);
    assert!(comment.satisfies(&row([("post_id", 1)])));
    assert!(!comment.satisfies(&row([("post_id", 2)])));
    assert!(comment.satisfies(&Row::new()));
}
