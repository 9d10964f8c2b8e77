//! The backend contract consumed by the mapper.

use log::debug;
use strata_foundation::{Result, Row};

use crate::cursor::{Cursor, RowSource};
use crate::model::ModelConfig;
use crate::query::{Outcome, Query, RequestKind};
use crate::relationship::{RelationConfig, RelationKind, Relationship};
use crate::schema::Schema;

/// Options controlling how raw rows are cast during hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOptions {
    /// Fail on values that do not convert, instead of keeping them raw.
    pub strict: bool,
    /// Fill declared defaults for fields the row lacks.
    pub defaults: bool,
}

impl CastOptions {
    /// Creates lenient options without defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict: false,
            defaults: false,
        }
    }

    /// Sets strict casting.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets default filling.
    #[must_use]
    pub const fn defaults(mut self, defaults: bool) -> Self {
        self.defaults = defaults;
        self
    }
}

impl Default for CastOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A storage backend.
///
/// Sources execute logical queries and hand back either single raw records
/// or streaming cursors. The mapper never sees backend protocol details.
pub trait Source {
    /// Returns the field schema of a model's backing collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is unknown to the backend.
    fn describe(&self, entity: &str) -> Result<Schema>;

    /// Inserts a record.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    fn create(&self, query: &Query) -> Result<Outcome>;

    /// Fetches records.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    fn read(&self, query: &Query) -> Result<Outcome>;

    /// Modifies records.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    fn update(&self, query: &Query) -> Result<Outcome>;

    /// Removes records.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    fn delete(&self, query: &Query) -> Result<Outcome>;

    /// Dispatches a query to the matching operation.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    fn execute(&self, query: &Query) -> Result<Outcome> {
        debug!(
            "event=query_dispatch module=source status=start model={} source={} kind={}",
            query.model,
            query.source,
            query.kind()
        );
        match query.kind() {
            RequestKind::Create => self.create(query),
            RequestKind::Read => self.read(query),
            RequestKind::Update => self.update(query),
            RequestKind::Delete => self.delete(query),
        }
    }

    /// Converts a raw row into typed data for `entity`.
    ///
    /// The default passes rows through unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a strict cast fails.
    fn cast(&self, entity: &str, row: Row, options: &CastOptions) -> Result<Row> {
        let _ = (entity, options);
        Ok(row)
    }

    /// Wraps a live backend resource in a cursor.
    fn result(&self, resource: Box<dyn RowSource>) -> Cursor {
        Cursor::from_boxed(resource)
    }

    /// Describes an association from `owner`.
    ///
    /// The default applies the standard key inference rule.
    fn relationship(
        &self,
        owner: &ModelConfig,
        kind: RelationKind,
        name: &str,
        config: RelationConfig,
    ) -> Relationship {
        Relationship::infer(owner, kind, name, config)
    }
}
