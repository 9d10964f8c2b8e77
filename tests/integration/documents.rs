//! Documents keyed on a composite (`id`, `rev`) primary key.

use std::rc::Rc;

use strata_foundation::{ErrorKind, Row, Value, row};
use strata_mapper::{EntityState, Model};
use strata_source::{KeyMap, MemorySource, ModelConfig, Outcome, RelationConfig, RelationKind};

fn documents() -> (Rc<MemorySource>, Model) {
    let source = Rc::new(MemorySource::new());
    let model = Model::new(
        ModelConfig::new("MockDocumentMultipleKey")
            .with_key(["id", "rev"])
            .with_source("documents"),
        source.clone(),
    );
    (source, model)
}

#[test]
fn composite_relationships_map_identity() {
    let (_, docs) = documents();
    let rel = docs.relationship(RelationKind::HasMany, "nodes", RelationConfig::new());
    assert_eq!(rel.key, KeyMap::identity(["id", "rev"]));
    assert_eq!(&*rel.field_name, "node");
}

#[test]
fn composite_identifier_is_a_map() {
    let (source, docs) = documents();
    source.seed(
        "documents",
        [row([
            ("id", Value::from(1)),
            ("rev", Value::from("a")),
            ("body", Value::from("x")),
        ])],
    );
    let doc = docs.first(Row::new()).unwrap().unwrap();
    assert_eq!(
        doc.id(),
        Some(Value::from(row([("id", Value::from(1)), ("rev", Value::from("a"))])))
    );
}

#[test]
fn composite_update_filters_on_every_key_field() {
    let (source, docs) = documents();
    source.seed(
        "documents",
        [
            row([("id", Value::from(1)), ("rev", Value::from("a")), ("body", Value::from("old"))]),
            row([("id", Value::from(1)), ("rev", Value::from("b")), ("body", Value::from("old"))]),
        ],
    );
    let mut doc = docs
        .first(row([("id", Value::from(1)), ("rev", Value::from("b"))]))
        .unwrap()
        .unwrap();
    doc.set("body", "new");
    assert!(matches!(doc.save(None).unwrap(), Outcome::Affected(1)));
    assert_eq!(doc.state(), EntityState::Synced);

    let bodies: Vec<Value> = source
        .rows("documents")
        .iter()
        .filter_map(|r| r.get(&"body".into()).cloned())
        .collect();
    assert_eq!(bodies, vec![Value::from("old"), Value::from("new")]);
}

#[test]
fn composite_update_without_revision_fails() {
    let (_, docs) = documents();
    let mut doc = docs
        .hydrate(row([("id", 1)]))
        .unwrap();
    doc.set("body", "new");
    let err = doc.save(None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingKey { ref field, .. } if field == "rev"));
}
