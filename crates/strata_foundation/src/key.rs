//! Index-or-name keys for rows and collections.

use std::fmt;
use std::sync::Arc;

/// Key addressing a slot in a row or collection.
///
/// Collections behave as sparse, order-preserving associative sequences, so a
/// key is either an integer index or a field name. Numeric strings normalise
/// to indices on conversion, which makes `"0"` and `0` address the same slot.
///
/// # Ordering
/// Indices sort before names; indices compare numerically and names
/// lexicographically.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Integer position.
    Index(i64),
    /// Field or member name.
    Name(Arc<str>),
}

impl Key {
    /// Creates a name key without numeric normalisation.
    #[must_use]
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        Self::Name(name.into())
    }

    /// Returns the index if this is an index key.
    #[must_use]
    pub const fn as_index(&self) -> Option<i64> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Name(_) => None,
        }
    }

    /// Returns the name if this is a name key.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Name(name) => Some(name),
        }
    }

    /// Parses a string key, normalising canonical integers to indices.
    ///
    /// Only canonical decimal forms normalise: `"7"` and `"-3"` become
    /// indices, while `"07"`, `"+7"` and `" 7"` stay names.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(i) if i.to_string() == s => Self::Index(i),
            _ => Self::Name(s.into()),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Self::Index(i64::from(i))
    }
}

impl From<usize> for Key {
    #[allow(clippy::cast_possible_wrap)]
    fn from(i: usize) -> Self {
        Self::Index(i as i64)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Arc<str>> for Key {
    fn from(s: Arc<str>) -> Self {
        Self::parse(&s)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Index(i) => serializer.collect_str(i),
            Self::Name(name) => serializer.serialize_str(name),
        }
    }
}
