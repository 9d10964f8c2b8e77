//! Integration tests for Key
//!
//! Tests index/name normalisation and ordering.

use strata_foundation::Key;

#[test]
fn canonical_integer_strings_become_indices() {
    assert_eq!(Key::from("0"), Key::Index(0));
    assert_eq!(Key::from("-3"), Key::Index(-3));
    assert_eq!(Key::from(String::from("12")), Key::from(12));
}

#[test]
fn non_canonical_strings_stay_names() {
    for s in ["07", "+7", " 7", "7.0", "baz"] {
        assert_eq!(Key::from(s).as_name(), Some(s), "{s:?}");
    }
}

#[test]
fn explicit_names_skip_normalisation() {
    assert_eq!(Key::name("5").as_name(), Some("5"));
    assert_ne!(Key::name("5"), Key::Index(5));
}

#[test]
fn indices_order_before_names() {
    let mut keys = vec![Key::from("b"), Key::from(2), Key::from("a"), Key::from(-1)];
    keys.sort();
    assert_eq!(
        keys,
        vec![Key::from(-1), Key::from(2), Key::from("a"), Key::from("b")]
    );
}

#[test]
fn display_matches_source_form() {
    assert_eq!(Key::from(4).to_string(), "4");
    assert_eq!(Key::from("title").to_string(), "title");
}
