//! Integration tests for Collection
//!
//! Tests keyed access, traversal, fan-out, and sorting through the public API.

use std::cmp::Ordering;

use strata_foundation::{Error, Key, Result, Value, row};
use strata_mapper::{Collection, Comparator, Element, Invocation, InvokeOptions};

/// Item tracking whether `mark` was called on it.
#[derive(Clone, Debug, Default)]
struct Marker {
    marker: bool,
}

impl Element for Marker {
    fn to_value(&self) -> Value {
        Value::from(row([("marker", Value::Bool(self.marker)), ("data", Value::from("foo"))]))
    }

    fn invoke(&mut self, method: &str, _args: &[Value]) -> Result<Value> {
        match method {
            "mark" => {
                self.marker = true;
                Ok(Value::Bool(true))
            }
            "map_array" => Ok(Value::from(vec!["foo"])),
            _ => Err(Error::unsupported_method(method, "marker")),
        }
    }
}

fn markers(n: usize) -> Collection<Marker> {
    (0..n).map(|_| Marker::default()).collect()
}

// =============================================================================
// Fan-out
// =============================================================================

#[test]
fn fan_out_equals_per_item_calls() {
    let mut fanned = markers(10);
    let results = fanned.call("mark", &[]).unwrap();

    let mut direct = Marker::default();
    let single = direct.invoke("mark", &[]).unwrap();

    assert_eq!(results, vec![single; 10]);
    assert!(fanned.values().all(|m| m.marker));
}

#[test]
fn fan_out_merge_flattens_vectors() {
    let mut c = markers(10);
    let merged = c
        .invoke("map_array", &[], InvokeOptions::new().merge(true))
        .unwrap()
        .into_values();
    assert_eq!(merged, vec![Value::from("foo"); 10]);
}

#[test]
fn fan_out_collect_keeps_keys() {
    let mut c: Collection<Marker> = Collection::from_pairs([(3, Marker::default()), (7, Marker::default())]);
    let Invocation::Collection(out) = c
        .invoke("mark", &[], InvokeOptions::new().collect(true))
        .unwrap()
    else {
        panic!("expected a collection");
    };
    assert_eq!(out.keys(), vec![Key::from(3), Key::from(7)]);
}

#[test]
fn fan_out_on_values() {
    let mut c: Collection<Value> = ["ab", "cde"].into_iter().map(Value::from).collect();
    assert_eq!(c.call("count", &[]).unwrap(), vec![Value::Int(2), Value::Int(3)]);
}

// =============================================================================
// Keyed Access and Traversal
// =============================================================================

#[test]
fn remove_during_traversal_keeps_survivors() {
    let data = [
        "Hello",
        "Delete me",
        "Delete me",
        "Delete me",
        "Delete me",
        "Delete me",
        "Hello again!",
        "Delete me",
    ];
    let mut c: Collection<Value> = data.into_iter().map(Value::from).collect();

    let mut key = c.key().cloned();
    while let Some(k) = key {
        if c.get(k.clone()) == Some(&Value::from("Delete me")) {
            c.remove(k);
            key = c.key().cloned();
        } else {
            c.next();
            key = c.key().cloned();
        }
    }

    assert_eq!(
        c.to_array(),
        Value::from(row([
            (Key::from(0), Value::from("Hello")),
            (Key::from(6), Value::from("Hello again!")),
        ]))
    );
}

#[test]
fn prev_from_start_wraps_to_end() {
    let mut c: Collection<Value> = [1, 2, 3].into_iter().map(Value::from).collect();
    assert_eq!(c.prev(), Some(&Value::Int(3)));
    assert_eq!(c.prev(), Some(&Value::Int(2)));
}

#[test]
fn to_array_round_trips() {
    let mut c: Collection<Value> = (0..5).map(Value::from).collect();
    c.remove(2);
    let array = c.to_array();
    assert_eq!(Collection::from_value(&array).to_array(), array);

    let dense: Collection<Value> = (0..3).map(Value::from).collect();
    assert_eq!(dense.to_array(), Value::from(vec![0, 1, 2]));
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn sort_by_closure() {
    let mut c: Collection<Value> = ["pear", "fig", "banana"].into_iter().map(Value::from).collect();
    let by_length = |a: &Value, b: &Value| {
        let len = |v: &Value| v.as_str().map_or(0, str::len);
        len(a).cmp(&len(b))
    };
    c.sort(Comparator::By(&by_length));
    assert_eq!(c.to_array(), Value::from(vec!["fig", "pear", "banana"]));
}

#[test]
fn reverse_sort_by_name() {
    let mut c: Collection<Value> = [1, 3, 2].into_iter().map(Value::from).collect();
    c.sort("rsort");
    assert_eq!(c.to_array(), Value::from(vec![3, 2, 1]));
}

#[test]
fn mixed_values_sort_stably() {
    let mut c: Collection<Value> = [Value::from("b"), Value::Int(1), Value::from("a")]
        .into_iter()
        .collect();
    c.sort(Comparator::Natural);
    let ordered = c.values().cloned().collect::<Vec<_>>();
    assert_eq!(ordered.len(), 3);
    assert_eq!(
        ordered.iter().position(|v| *v == Value::from("a")).cmp(&ordered.iter().position(|v| *v == Value::from("b"))),
        Ordering::Less
    );
}
