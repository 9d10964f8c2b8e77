//! Integration tests for Error types
//!
//! Tests error construction, messages, and context.

use strata_foundation::{Error, ErrorContext, ErrorKind, Type};

#[test]
fn unbound_model_message() {
    let err = Error::unbound_model("invalid");
    assert_eq!(
        err.to_string(),
        "No model bound or unhandled method call `invalid`."
    );
}

#[test]
fn unsupported_method_names_item() {
    let err = Error::unsupported_method("mark", "int");
    assert!(matches!(err.kind, ErrorKind::UnsupportedMethod { .. }));
    assert_eq!(err.to_string(), "unsupported method `mark` on int");
}

#[test]
fn type_mismatch_message() {
    let err = Error::type_mismatch(Type::Int, Type::String);
    assert_eq!(err.to_string(), "type mismatch: expected int, got string");
}

#[test]
fn backend_errors_are_source_kind() {
    let err = Error::backend("connection refused");
    assert!(matches!(err.kind, ErrorKind::Source(ref m) if m == "connection refused"));
}

#[test]
fn context_is_optional_and_displayable() {
    let err = Error::missing_key("Post", "id");
    assert!(err.context.is_none());

    let err = err.with_context(
        ErrorContext::new()
            .with_model("Post")
            .with_operation("update")
            .with_frame("Entity::save"),
    );
    let context = err.context.unwrap();
    assert_eq!(context.to_string(), "in Post::update\n  in Entity::save\n");
}
