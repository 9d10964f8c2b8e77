//! Integration tests for MemorySource
//!
//! Tests CRUD dispatch, journaling, schemas, and casting.

use strata_foundation::{ErrorKind, Key, Result, Row, Type, Value, row};
use strata_source::{
    CastOptions, EntityRequest, FieldSchema, MemorySource, Outcome, Query, RequestKind, Schema,
    Source,
};

fn posts() -> MemorySource {
    MemorySource::new().with_table(
        "posts",
        Schema::new()
            .with_field(FieldSchema::new("id", Type::Int))
            .with_field(FieldSchema::new("title", Type::String).with_length(255))
            .with_field(FieldSchema::new("published", Type::Bool).with_default(false)),
    )
}

fn query(request: EntityRequest) -> Query {
    Query::new("Post", "posts", request)
}

fn read(source: &MemorySource, conditions: Row) -> Vec<Row> {
    match source.execute(&query(EntityRequest::read(conditions))) {
        Ok(Outcome::Rows(cursor)) => cursor.collect::<Result<Vec<_>>>().unwrap(),
        other => panic!("expected rows, got {other:?}"),
    }
}

#[test]
fn create_fills_defaults_and_ids() {
    let source = posts();
    let outcome = source
        .execute(&query(EntityRequest::Create {
            data: row([("title", "Hello")]),
        }))
        .unwrap();
    assert_eq!(outcome.created_id(), Some(&Value::Int(1)));

    let stored = read(&source, Row::new());
    assert_eq!(
        stored,
        vec![row([
            ("id", Value::from(1)),
            ("title", Value::from("Hello")),
            ("published", Value::Bool(false)),
        ])]
    );
}

#[test]
fn read_limit_caps_rows() {
    let source = posts();
    source.seed("posts", (1..=5).map(|i| row([("id", i)])));
    let outcome = source
        .execute(&query(EntityRequest::Read {
            conditions: Row::new(),
            limit: Some(2),
        }))
        .unwrap();
    let Outcome::Rows(cursor) = outcome else {
        panic!("expected rows");
    };
    assert_eq!(cursor.count(), 2);
}

#[test]
fn journal_records_every_request() {
    let source = posts();
    source
        .execute(&query(EntityRequest::Create { data: row([("title", "a")]) }))
        .unwrap();
    source
        .execute(&query(EntityRequest::Update {
            data: row([("title", "b")]),
            conditions: row([("id", 1)]),
        }))
        .unwrap();
    source
        .execute(&query(EntityRequest::Delete { conditions: row([("id", 1)]) }))
        .unwrap();

    let kinds: Vec<RequestKind> = source.journal().iter().map(Query::kind).collect();
    assert_eq!(
        kinds,
        vec![RequestKind::Create, RequestKind::Update, RequestKind::Delete]
    );
    assert!(source.rows("posts").is_empty());
}

#[test]
fn describe_reports_schema() {
    let schema = posts().describe("posts").unwrap();
    assert_eq!(schema.names().collect::<Vec<_>>(), vec!["id", "title", "published"]);
    assert_eq!(schema.field("title").and_then(|f| f.length), Some(255));
}

#[test]
fn cast_with_defaults() {
    let raw = row([("id", "3")]);
    let cast = posts()
        .cast("posts", raw, &CastOptions::new().defaults(true))
        .unwrap();
    assert_eq!(cast.get(&Key::from("id")), Some(&Value::Int(3)));
    assert_eq!(cast.get(&Key::from("published")), Some(&Value::Bool(false)));
}

#[test]
fn strict_cast_rejects_garbage() {
    let err = posts()
        .cast("posts", row([("published", "maybe")]), &CastOptions::new().strict(true))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn unknown_table_reads_empty() {
    let source = MemorySource::new();
    let outcome = source
        .read(&Query::new("Widget", "widgets", EntityRequest::read(Row::new())))
        .unwrap();
    let Outcome::Rows(cursor) = outcome else {
        panic!("expected rows");
    };
    assert_eq!(cursor.count(), 0);
}
