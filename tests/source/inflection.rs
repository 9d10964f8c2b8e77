//! Integration tests for the inflector
//!
//! Tests the name forms used for tables, keys, and relationship fields.

use strata_source::inflector::{camelize, classify, pluralize, singularize, tableize, underscore};

#[test]
fn regular_plurals() {
    assert_eq!(pluralize("comment"), "comments");
    assert_eq!(pluralize("category"), "categories");
    assert_eq!(pluralize("box"), "boxes");
    assert_eq!(singularize("comments"), "comment");
    assert_eq!(singularize("categories"), "category");
}

#[test]
fn irregular_and_uninflected() {
    assert_eq!(pluralize("person"), "people");
    assert_eq!(singularize("people"), "person");
    assert_eq!(pluralize("sheep"), "sheep");
}

#[test]
fn case_forms() {
    assert_eq!(underscore("BlogPost"), "blog_post");
    assert_eq!(camelize("blog_post"), "BlogPost");
    assert_eq!(classify("comments"), "Comment");
    assert_eq!(tableize("BlogPost"), "blog_posts");
}
