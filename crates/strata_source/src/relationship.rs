//! Named associations between models and their inferred key mappings.
//!
//! Key naming follows one fixed rule, computed from the association kind,
//! the owning model's primary key shape and the relation name:
//!
//! | owning key | kind        | key mapping                    | field name      |
//! |------------|-------------|--------------------------------|-----------------|
//! | composite  | any         | every key field to itself      | singular stem   |
//! | single     | `HasMany`   | `{ pk: "<owner>_id" }`         | plural stem     |
//! | single     | `HasOne`    | `{ pk: "<owner>_id" }`         | singular stem   |
//! | single     | `BelongsTo` | `{ "<stem>_id": related pk }`  | singular stem   |
//!
//! where the stem is the underscored singular of the relation name.

use std::fmt;
use std::sync::Arc;

use log::debug;
use strata_foundation::{Key, Row};

use crate::inflector;
use crate::model::{ModelConfig, PrimaryKey};
use crate::query::{EntityRequest, Query};

/// Association type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// The owning record holds the foreign key.
    BelongsTo,
    /// One related record holds a key back to the owner.
    HasOne,
    /// Many related records hold a key back to the owner.
    HasMany,
}

impl RelationKind {
    /// Returns true if at most one related record exists.
    #[must_use]
    pub const fn is_singular(self) -> bool {
        !matches!(self, Self::HasMany)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BelongsTo => "belongsTo",
            Self::HasOne => "hasOne",
            Self::HasMany => "hasMany",
        };
        f.write_str(name)
    }
}

/// Ordered pairs of (owning-side field, related-side field).
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyMap(Vec<(Arc<str>, Arc<str>)>);

impl KeyMap {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a single-pair mapping.
    #[must_use]
    pub fn single(from: impl Into<Arc<str>>, to: impl Into<Arc<str>>) -> Self {
        Self(vec![(from.into(), to.into())])
    }

    /// Maps every field to itself.
    #[must_use]
    pub fn identity<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self(
            fields
                .into_iter()
                .map(|f| {
                    let f = f.into();
                    (f.clone(), f)
                })
                .collect(),
        )
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the related-side field for an owning-side field.
    #[must_use]
    pub fn get(&self, from: &str) -> Option<&str> {
        self.0.iter().find(|(f, _)| &**f == from).map(|(_, t)| &**t)
    }

    /// Iterates pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, t)| (&**f, &**t))
    }
}

impl<F: Into<Arc<str>>, T: Into<Arc<str>>> FromIterator<(F, T)> for KeyMap {
    fn from_iter<I: IntoIterator<Item = (F, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(f, t)| (f.into(), t.into())).collect())
    }
}

impl fmt::Debug for KeyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Caller-supplied overrides for an association.
///
/// Every field left unset is inferred.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelationConfig {
    /// Related model name (defaults to the classified relation name).
    pub to: Option<Arc<str>>,
    /// Explicit key mapping.
    pub key: Option<KeyMap>,
    /// Explicit accessor field name.
    pub field_name: Option<Arc<str>>,
    /// Primary key of the related model (defaults to `id`).
    pub related_key: Option<PrimaryKey>,
}

impl RelationConfig {
    /// Creates an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the related model name.
    #[must_use]
    pub fn with_to(mut self, to: impl Into<Arc<str>>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the key mapping.
    #[must_use]
    pub fn with_key(mut self, key: KeyMap) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the accessor field name.
    #[must_use]
    pub fn with_field_name(mut self, field_name: impl Into<Arc<str>>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    /// Sets the related model's primary key.
    #[must_use]
    pub fn with_related_key(mut self, key: impl Into<PrimaryKey>) -> Self {
        self.related_key = Some(key.into());
        self
    }
}

/// A resolved association from one model to another.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    /// Association type.
    pub kind: RelationKind,
    /// Relation name as declared (`comments`, `post`).
    pub name: Arc<str>,
    /// Owning model name.
    pub from: Arc<str>,
    /// Related model name.
    pub to: Arc<str>,
    /// Owning-side to related-side field mapping.
    pub key: KeyMap,
    /// Accessor field name on owning entities.
    pub field_name: Arc<str>,
}

impl Relationship {
    /// Infers an association from `owner` named `name`.
    #[must_use]
    pub fn infer(
        owner: &ModelConfig,
        kind: RelationKind,
        name: &str,
        config: RelationConfig,
    ) -> Self {
        let stem = inflector::underscore(&inflector::singularize(name));
        let related_key = config.related_key.unwrap_or_default();

        let (key, field) = match &owner.key {
            PrimaryKey::Composite(fields) => (KeyMap::identity(fields.iter().cloned()), stem.clone()),
            PrimaryKey::Single(pk) => match kind {
                RelationKind::HasMany | RelationKind::HasOne => {
                    let owner_stem = inflector::underscore(&inflector::singularize(&owner.name));
                    let field = if kind == RelationKind::HasMany {
                        inflector::pluralize(&stem)
                    } else {
                        stem.clone()
                    };
                    (KeyMap::single(pk.clone(), format!("{owner_stem}_id")), field)
                }
                RelationKind::BelongsTo => (
                    KeyMap::single(format!("{stem}_id"), related_key.primary()),
                    stem.clone(),
                ),
            },
        };

        let relationship = Self {
            kind,
            name: name.into(),
            from: owner.name.clone(),
            to: config
                .to
                .unwrap_or_else(|| inflector::classify(name).into()),
            key: config.key.unwrap_or(key),
            field_name: config.field_name.unwrap_or_else(|| field.into()),
        };
        debug!(
            "event=relationship_infer module=relationship status=ok from={} kind={} name={} to={} key={:?}",
            relationship.from, relationship.kind, relationship.name, relationship.to, relationship.key
        );
        relationship
    }

    /// Builds the related-side filters for one owning record.
    ///
    /// Returns `None` if the owner lacks any owning-side key field, since no
    /// related record can match.
    #[must_use]
    pub fn conditions(&self, owner: &Row) -> Option<Row> {
        let mut conditions = Row::new();
        for (from, to) in self.key.iter() {
            let value = owner.get(&Key::from(from)).filter(|v| !v.is_nil())?;
            conditions = conditions.insert(Key::from(to), value.clone());
        }
        Some(conditions)
    }

    /// Builds the read query fetching related records for one owner.
    #[must_use]
    pub fn query(&self, related: &ModelConfig, owner: &Row) -> Option<Query> {
        let conditions = self.conditions(owner)?;
        let limit = self.kind.is_singular().then_some(1);
        Some(Query::new(
            related.name.clone(),
            related.source(),
            EntityRequest::Read { conditions, limit },
        ))
    }
}
