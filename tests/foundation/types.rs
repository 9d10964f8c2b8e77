//! Integration tests for Type descriptors
//!
//! Tests backend type-name parsing and acceptance rules.

use strata_foundation::Type;

#[test]
fn parse_backend_names() {
    assert_eq!(Type::parse("int"), Type::Int);
    assert_eq!(Type::parse("TINYINT"), Type::Int);
    assert_eq!(Type::parse("varchar"), Type::String);
    assert_eq!(Type::parse("text"), Type::Text);
    assert_eq!(Type::parse("datetime"), Type::DateTime);
    assert_eq!(Type::parse("blob"), Type::Bytes);
    assert_eq!(Type::parse("geometry"), Type::Any);
}

#[test]
fn float_accepts_int() {
    assert!(Type::Float.accepts(&Type::Int));
    assert!(!Type::Int.accepts(&Type::Float));
}

#[test]
fn textual_types_accept_each_other() {
    assert!(Type::Text.accepts(&Type::String));
    assert!(Type::String.accepts(&Type::Text));
    assert!(!Type::String.accepts(&Type::Int));
}

#[test]
fn any_accepts_everything() {
    assert!(Type::Any.accepts(&Type::Bytes));
    assert!(Type::Any.is_any());
}

#[test]
fn display_is_lowercase() {
    assert_eq!(Type::vec(Type::String).to_string(), "vec<string>");
    assert!(Type::option(Type::Int).is_nullable());
}
