//! Integration tests for Cursor
//!
//! Tests lazy pulling, exhaustion, and exactly-once release.

use std::cell::Cell;
use std::rc::Rc;

use strata_foundation::{Result, Row, Value, row};
use strata_source::{Cursor, RowSource, VecRows};

/// Wraps rows and counts pulls and releases.
struct Counted {
    rows: VecRows,
    pulls: Rc<Cell<usize>>,
    closes: Rc<Cell<usize>>,
}

impl RowSource for Counted {
    fn next_row(&mut self) -> Result<Option<Row>> {
        self.pulls.set(self.pulls.get() + 1);
        self.rows.next_row()
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}

fn counted(rows: Vec<Row>) -> (Cursor, Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let pulls = Rc::new(Cell::new(0));
    let closes = Rc::new(Cell::new(0));
    let cursor = Cursor::new(Counted {
        rows: VecRows::new(rows),
        pulls: pulls.clone(),
        closes: closes.clone(),
    });
    (cursor, pulls, closes)
}

// =============================================================================
// Pulling
// =============================================================================

#[test]
fn two_row_result() {
    let (mut cursor, _, _) = counted(vec![
        row([("id", Value::from(1)), ("data", Value::from("data1"))]),
        row([("id", Value::from(2)), ("data", Value::from("data2"))]),
    ]);
    assert!(cursor.valid());
    assert_eq!(cursor.key(), 0);

    let first = cursor.next().unwrap().unwrap();
    assert_eq!(first, row([("id", Value::from(1)), ("data", Value::from("data1"))]));
    assert_eq!(cursor.current(), Some(&first));
    assert_eq!(cursor.key(), 1);

    let second = cursor.next().unwrap().unwrap();
    assert_eq!(second.get(&"data".into()), Some(&Value::from("data2")));
    assert_eq!(cursor.key(), 2);

    assert!(cursor.next().is_none());
    assert!(!cursor.valid());
    assert_eq!(cursor.current(), None);
}

#[test]
fn pulls_happen_on_demand() {
    let (mut cursor, pulls, _) = counted(vec![row([("id", 1)]), row([("id", 2)])]);
    assert_eq!(pulls.get(), 0);
    cursor.next();
    assert_eq!(pulls.get(), 1);
}

// =============================================================================
// Release
// =============================================================================

#[test]
fn exhaustion_releases_once() {
    let (mut cursor, pulls, closes) = counted(vec![row([("id", 1)])]);
    assert_eq!(cursor.by_ref().count(), 1);
    assert_eq!(closes.get(), 1);

    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
    assert_eq!(pulls.get(), 2);
    drop(cursor);
    assert_eq!(closes.get(), 1);
}

#[test]
fn explicit_close_is_idempotent() {
    let (mut cursor, pulls, closes) = counted(vec![row([("id", 1)])]);
    cursor.close();
    cursor.close();
    assert!(cursor.next().is_none());
    assert_eq!(pulls.get(), 0);
    assert_eq!(closes.get(), 1);
}

#[test]
fn abandoned_cursor_releases_on_drop() {
    let (mut cursor, _, closes) = counted(vec![row([("id", 1)]), row([("id", 2)])]);
    cursor.next();
    drop(cursor);
    assert_eq!(closes.get(), 1);
}

#[test]
fn never_opened_cursor_is_empty() {
    let mut cursor = Cursor::closed();
    assert!(!cursor.valid());
    assert!(cursor.next().is_none());
    assert_eq!(cursor.key(), 0);
}
