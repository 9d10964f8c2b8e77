//! Per-model configuration.

use std::fmt;
use std::sync::Arc;

use strata_foundation::{Key, Row, Value};

use crate::inflector;

/// Primary key shape of a model.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PrimaryKey {
    /// One key field.
    Single(Arc<str>),
    /// Two or more key fields, in order.
    Composite(Vec<Arc<str>>),
}

impl PrimaryKey {
    /// Builds a key from field names.
    ///
    /// A single-element list is a single key, not a composite one.
    #[must_use]
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let mut fields: Vec<Arc<str>> = fields.into_iter().map(Into::into).collect();
        match fields.len() {
            0 => Self::default(),
            1 => Self::Single(fields.remove(0)),
            _ => Self::Composite(fields),
        }
    }

    /// Returns true for composite keys.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Returns the key fields in order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::Single(field) => vec![&**field],
            Self::Composite(fields) => fields.iter().map(|f| &**f).collect(),
        }
    }

    /// Returns the first (or only) key field.
    #[must_use]
    pub fn primary(&self) -> &str {
        match self {
            Self::Single(field) => field,
            Self::Composite(fields) => fields.first().map_or("id", |f| &**f),
        }
    }

    /// Extracts the key value from a record.
    ///
    /// Single keys yield the field value; composite keys yield a map of every
    /// key field. Returns `None` if any key field is missing or nil.
    #[must_use]
    pub fn extract(&self, row: &Row) -> Option<Value> {
        match self {
            Self::Single(field) => row
                .get(&Key::name(field.clone()))
                .filter(|v| !v.is_nil())
                .cloned(),
            Self::Composite(fields) => {
                let mut out = Row::new();
                for field in fields {
                    let key = Key::name(field.clone());
                    let value = row.get(&key).filter(|v| !v.is_nil())?;
                    out = out.insert(key, value.clone());
                }
                Some(Value::Map(out))
            }
        }
    }
}

impl Default for PrimaryKey {
    fn default() -> Self {
        Self::Single("id".into())
    }
}

impl From<&str> for PrimaryKey {
    fn from(field: &str) -> Self {
        Self::Single(field.into())
    }
}

impl<const N: usize> From<[&str; N]> for PrimaryKey {
    fn from(fields: [&str; N]) -> Self {
        Self::from_fields(fields)
    }
}

impl fmt::Debug for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(field) => write!(f, "{field:?}"),
            Self::Composite(fields) => f.debug_list().entries(fields).finish(),
        }
    }
}

/// Metadata describing one model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelConfig {
    /// Model name (`Post`, `Comment`).
    pub name: Arc<str>,
    /// Primary key shape.
    pub key: PrimaryKey,
    /// Backend table or collection name, if not derived from the name.
    pub source: Option<Arc<str>>,
    /// Field used as the human-readable title.
    pub title: Option<Arc<str>>,
}

impl ModelConfig {
    /// Creates a config keyed on `id`.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the primary key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<PrimaryKey>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the backend table or collection name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the title field.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<Arc<str>>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns the backend name: the explicit source, else the tableized
    /// model name (`BlogPost` becomes `blog_posts`).
    #[must_use]
    pub fn source(&self) -> Arc<str> {
        self.source
            .clone()
            .unwrap_or_else(|| inflector::tableize(&self.name).into())
    }
}
