//! Integration tests for Value types
//!
//! Tests Value variants, truthiness, equality, hashing, display, and
//! conversions.

use std::collections::HashSet;
use std::sync::Arc;

use strata_foundation::{Key, Row, Type, Value, row};

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_nil() {
    let v = Value::Nil;
    assert!(v.is_nil());
    assert!(!v.is_truthy());
    assert_eq!(v.value_type(), Type::Nil);
}

#[test]
fn value_int() {
    let v = Value::Int(42);
    assert!(v.is_truthy());
    assert_eq!(v.as_int(), Some(42));
    assert_eq!(v.as_float(), None);
    assert_eq!(v.as_number(), Some(42.0));
}

#[test]
fn value_string() {
    let v = Value::String(Arc::from("hello"));
    assert!(v.is_truthy());
    assert_eq!(v.as_str(), Some("hello"));
}

#[test]
fn value_bytes() {
    let v = Value::bytes(&b"abc"[..]);
    assert_eq!(v.as_bytes(), Some(&b"abc"[..]));
    assert_eq!(v.value_type(), Type::Bytes);
}

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn empty_values_are_falsy() {
    let falsy = [
        Value::Nil,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::from(""),
        Value::from("0"),
        Value::from(Vec::<i64>::new()),
        Value::from(Row::new()),
    ];
    for v in falsy {
        assert!(!v.is_truthy(), "{v:?} should be falsy");
    }
}

#[test]
fn non_empty_values_are_truthy() {
    let truthy = [
        Value::Bool(true),
        Value::Int(-1),
        Value::from("Hello"),
        Value::from("00"),
        Value::from(vec![0]),
        Value::from(row([("a", 0)])),
    ];
    for v in truthy {
        assert!(v.is_truthy(), "{v:?} should be truthy");
    }
}

// =============================================================================
// Equality and Hashing
// =============================================================================

#[test]
fn float_equality_is_bitwise() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_ne!(Value::Float(0.0), Value::Float(-0.0));
}

#[test]
fn int_and_float_are_distinct() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert!(Value::Int(1) < Value::Float(1.5));
}

#[test]
fn values_hash_consistently() {
    let mut set = HashSet::new();
    set.insert(Value::from("a"));
    set.insert(Value::from("a"));
    set.insert(Value::Int(1));
    set.insert(Value::from(row([("k", 1)])));
    set.insert(Value::from(row([("k", 1)])));
    assert_eq!(set.len(), 3);
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_forms() {
    assert_eq!(Value::Nil.to_string(), "");
    assert_eq!(Value::Bool(true).to_string(), "1");
    assert_eq!(Value::Bool(false).to_string(), "0");
    assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
    assert_eq!(Value::from(row([("a", 1)])).to_string(), "{a: 1}");
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn option_conversion() {
    assert_eq!(Value::from(None::<i64>), Value::Nil);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn to_key_parses_strings() {
    assert_eq!(Value::from("3").to_key(), Some(Key::Index(3)));
    assert_eq!(Value::from("title").to_key(), Some(Key::from("title")));
    assert_eq!(Value::Int(7).to_key(), Some(Key::Index(7)));
    assert_eq!(Value::Float(1.0).to_key(), None);
}

#[test]
fn row_builder_normalises_keys() {
    let r = row([("0", "zero"), ("name", "n")]);
    assert_eq!(r.get(&Key::Index(0)), Some(&Value::from("zero")));
    assert_eq!(r.len(), 2);
}
