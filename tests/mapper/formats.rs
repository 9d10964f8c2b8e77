//! Integration tests for export formats
//!
//! Tests owned registries, ad-hoc converters, and the shared registry.

use strata_foundation::{Key, Value, row};
use strata_mapper::format::{register_shared, remove_shared, shared_converter};
use strata_mapper::{Collection, Entity, FormatOptions, FormatRegistry, converter};

fn sample() -> Collection<Value> {
    Collection::from_value(&Value::from(row([
        (Key::from(0), Value::from("hello")),
        (Key::from(1), Value::from("goodbye")),
        (Key::from("foo"), Value::from(row([(Key::from(0), Value::from("bar")), (Key::from("baz"), Value::from("dib"))]))),
    ])))
}

#[test]
fn json_export_with_owned_registry() {
    let c = sample().with_formats(FormatRegistry::with_defaults());
    assert_eq!(
        c.to("json"),
        Some(Value::from(r#"{"0":"hello","1":"goodbye","foo":{"0":"bar","baz":"dib"}}"#))
    );
    assert_eq!(
        c.to_with("json", &FormatOptions::new().pretty(true))
            .and_then(|v| v.as_str().map(|s| s.contains('\n'))),
        Some(true)
    );
}

#[test]
fn empty_registry_knows_nothing() {
    let c = sample().with_formats(FormatRegistry::new());
    assert_eq!(c.to("json"), None);
    assert!(c.to("array").is_some());
}

#[test]
fn ad_hoc_converter() {
    let c = sample().with_formats(FormatRegistry::new());
    let keys = converter(|v, _| {
        v.as_map()
            .map(|m| Value::from(m.keys().map(ToString::to_string).collect::<Vec<_>>()))
    });
    assert_eq!(c.to(keys), Some(Value::from(vec!["0", "1", "foo"])));
}

#[test]
fn entity_export_through_owned_formats() {
    let entity = Entity::new().with_data(row([("foo", "bar")]));
    let formats = strata_mapper::Formats::owned(FormatRegistry::with_defaults());
    assert_eq!(
        entity.export("json", &formats).value(),
        Some(Value::from(r#"{"foo":"bar"}"#))
    );
}

#[test]
fn shared_registry_is_consulted_at_conversion_time() {
    let c = sample();
    assert_eq!(c.to("shout"), None);

    register_shared(
        "shout",
        converter(|v, _| v.as_map().map(|m| Value::from(m.len()))),
    );
    assert!(shared_converter("shout").is_some());
    assert_eq!(c.to("shout"), Some(Value::Int(3)));

    assert!(remove_shared("shout").is_some());
    assert_eq!(c.to("shout"), None);
}
