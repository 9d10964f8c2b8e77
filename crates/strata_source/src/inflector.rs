//! English word inflection for model, table and key names.
//!
//! Only the last word of a compound name inflects: `BlogPost` pluralizes to
//! `BlogPosts` and `blog_posts` singularizes to `blog_post`.

use convert_case::{Case, Casing};

const UNINFLECTED: &[&str] = &[
    "data",
    "deer",
    "equipment",
    "fish",
    "information",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

/// (singular, plural)
const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("mouse", "mice"),
    ("movie", "movies"),
    ("ox", "oxen"),
    ("person", "people"),
    ("status", "statuses"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

/// Returns the plural form of `word`.
#[must_use]
pub fn pluralize(word: &str) -> String {
    inflect_tail(word, pluralize_word)
}

/// Returns the singular form of `word`.
#[must_use]
pub fn singularize(word: &str) -> String {
    inflect_tail(word, singularize_word)
}

/// Converts `BlogPost` or `blogPost` to `blog_post`.
#[must_use]
pub fn underscore(word: &str) -> String {
    word.to_case(Case::Snake)
}

/// Converts `blog_post` to `BlogPost`.
#[must_use]
pub fn camelize(word: &str) -> String {
    word.to_case(Case::UpperCamel)
}

/// Converts a table or relation name to a model name: `blog_posts` becomes
/// `BlogPost`.
#[must_use]
pub fn classify(name: &str) -> String {
    camelize(&singularize(&underscore(name)))
}

/// Converts a model name to a table name: `BlogPost` becomes `blog_posts`.
#[must_use]
pub fn tableize(name: &str) -> String {
    pluralize(&underscore(name))
}

fn pluralize_word(lower: &str) -> String {
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, p)| *p == lower) {
        return lower.to_string();
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{lower}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    format!("{lower}s")
}

fn singularize_word(lower: &str) -> String {
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == lower) {
        return (*singular).to_string();
    }
    if IRREGULAR.iter().any(|(s, _)| *s == lower) {
        return lower.to_string();
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if ["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        return lower.to_string();
    }
    lower.strip_suffix('s').unwrap_or(lower).to_string()
}

/// Applies `rule` to the last word of `word`, keeping the prefix and the
/// capitalisation of the inflected word.
fn inflect_tail(word: &str, rule: fn(&str) -> String) -> String {
    let split = tail_start(word);
    let (head, tail) = word.split_at(split);
    if tail.is_empty() {
        return word.to_string();
    }

    let lower = tail.to_lowercase();
    if UNINFLECTED.contains(&lower.as_str()) {
        return word.to_string();
    }

    let inflected = rule(&lower);
    let capitalised = tail.chars().next().is_some_and(char::is_uppercase);
    if capitalised {
        let mut chars = inflected.chars();
        let first = chars.next().map(|c| c.to_uppercase().collect::<String>());
        format!("{head}{}{}", first.unwrap_or_default(), chars.as_str())
    } else {
        format!("{head}{inflected}")
    }
}

/// Byte offset where the last word of a snake or camel case name begins.
fn tail_start(word: &str) -> usize {
    let after_underscore = word.rfind('_').map_or(0, |i| i + 1);
    let last_upper = word
        .char_indices()
        .skip(1)
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0);
    after_underscore.max(last_upper)
}
