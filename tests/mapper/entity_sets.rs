//! Integration tests for EntitySet
//!
//! Tests lazy hydration, rewinding, exhaustion, and resource release.

use std::cell::Cell;
use std::rc::Rc;

use strata_foundation::{Result, Row, Value, row};
use strata_mapper::{EntitySet, InvokeOptions, Model};
use strata_source::{CastOptions, Cursor, MemorySource, ModelConfig, RowSource, VecRows};

/// Row source counting pulls and releases.
struct Tracked {
    rows: VecRows,
    pulls: Rc<Cell<usize>>,
    closes: Rc<Cell<usize>>,
}

impl RowSource for Tracked {
    fn next_row(&mut self) -> Result<Option<Row>> {
        self.pulls.set(self.pulls.get() + 1);
        self.rows.next_row()
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

fn tracked(n: i64) -> (Cursor, Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let pulls = Rc::new(Cell::new(0));
    let closes = Rc::new(Cell::new(0));
    let cursor = Cursor::new(Tracked {
        rows: VecRows::new((1..=n).map(|i| row([("id", Value::Int(i))]))),
        pulls: pulls.clone(),
        closes: closes.clone(),
    });
    (cursor, pulls, closes)
}

fn model() -> Model {
    Model::new(ModelConfig::new("Post"), Rc::new(MemorySource::new()))
}

// =============================================================================
// Laziness
// =============================================================================

#[test]
fn n_plus_one_next_calls() {
    let (cursor, _, _) = tracked(4);
    let mut set = EntitySet::new(model(), cursor);

    let mut seen = Vec::new();
    for _ in 0..5 {
        match set.next().unwrap() {
            Some(entity) => seen.push(entity.id()),
            None => seen.push(None),
        }
    }
    assert_eq!(
        seen,
        vec![
            Some(Value::Int(1)),
            Some(Value::Int(2)),
            Some(Value::Int(3)),
            Some(Value::Int(4)),
            None,
        ]
    );
    assert!(set.next().unwrap().is_none());
}

#[test]
fn rewind_does_not_rehydrate() {
    let (cursor, pulls, _) = tracked(3);
    let mut set = EntitySet::new(model(), cursor);
    while set.next().unwrap().is_some() {}
    let after_first_pass = pulls.get();

    set.rewind().unwrap();
    let mut second_pass = 1;
    while set.next().unwrap().is_some() {
        second_pass += 1;
    }
    assert_eq!(second_pass, 3);
    assert_eq!(pulls.get(), after_first_pass);
}

#[test]
fn entities_are_bound_and_persisted() {
    let mut set = EntitySet::from_rows(Some(model()), vec![row([("id", 1)])]);
    let entity = set.next().unwrap().unwrap();
    assert!(entity.exists());
    assert_eq!(entity.model().map(Model::name), Some("Post"));
}

// =============================================================================
// Release
// =============================================================================

#[test]
fn exhaustion_releases_once() {
    let (cursor, _, closes) = tracked(2);
    let mut set = EntitySet::new(model(), cursor);
    assert_eq!(set.count().unwrap(), 2);
    assert!(set.is_exhausted());
    assert_eq!(closes.get(), 1);
    drop(set);
    assert_eq!(closes.get(), 1);
}

#[test]
fn early_drop_releases_once() {
    let (cursor, _, closes) = tracked(10);
    let mut set = EntitySet::new(model(), cursor);
    set.next().unwrap();
    set.next().unwrap();
    drop(set);
    assert_eq!(closes.get(), 1);
}

// =============================================================================
// Export and Fan-out
// =============================================================================

#[test]
fn data_exports_every_entity() {
    let mut set = EntitySet::from_rows(None, vec![row([("id", 1)]), row([("id", 2)])]);
    assert_eq!(
        set.data().unwrap(),
        Value::from(vec![Value::from(row([("id", 1)])), Value::from(row([("id", 2)]))])
    );
}

#[test]
fn invoke_fans_out_over_entities() {
    let (cursor, _, _) = tracked(3);
    let mut set = EntitySet::new(model(), cursor);
    let ids = set
        .invoke("id", &[], InvokeOptions::new())
        .unwrap()
        .into_values();
    assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn strict_hydration_failure_propagates() {
    let source = Rc::new(MemorySource::new().with_table(
        "posts",
        strata_source::Schema::new()
            .with_field(strata_source::FieldSchema::new("id", strata_foundation::Type::Int)),
    ));
    let posts = Model::new(ModelConfig::new("Post"), source)
        .with_cast_options(CastOptions::new().strict(true));
    let mut set = EntitySet::from_rows(Some(posts), vec![row([("id", "not a number")])]);
    assert!(set.next().is_err());
}
