//! Model handles binding configuration to a source.
//!
//! A [`Model`] is a cheap, cloneable handle. Entities and entity sets hold a
//! handle, never the model itself. Relationships are memoised per name on
//! first lookup; related models are linked weakly so that mutually related
//! models (`Post` has many `Comment`, `Comment` belongs to `Post`) do not keep
//! each other alive.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use log::debug;
use strata_foundation::{Error, ErrorContext, ErrorKind, Result, Row};
use strata_source::{
    CastOptions, Cursor, EntityRequest, ModelConfig, Outcome, PrimaryKey, Query, RelationConfig,
    RelationKind, Relationship, Schema, Source,
};

use crate::entity::Entity;
use crate::entity_set::EntitySet;

struct ModelInner {
    config: ModelConfig,
    source: Rc<dyn Source>,
    cast: Cell<CastOptions>,
    relationships: RefCell<BTreeMap<Arc<str>, Rc<Relationship>>>,
    links: RefCell<BTreeMap<Arc<str>, Weak<ModelInner>>>,
}

/// Handle to a model bound to a source.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    /// Binds `config` to `source`.
    #[must_use]
    pub fn new(config: ModelConfig, source: Rc<dyn Source>) -> Self {
        Self {
            inner: Rc::new(ModelInner {
                config,
                source,
                cast: Cell::new(CastOptions::new()),
                relationships: RefCell::new(BTreeMap::new()),
                links: RefCell::new(BTreeMap::new()),
            }),
        }
    }

    /// Sets the options used when hydrating rows.
    #[must_use]
    pub fn with_cast_options(self, options: CastOptions) -> Self {
        self.inner.cast.set(options);
        self
    }

    /// Returns the hydration cast options.
    #[must_use]
    pub fn cast_options(&self) -> CastOptions {
        self.inner.cast.get()
    }

    /// Returns the model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Returns the primary key shape.
    #[must_use]
    pub fn key(&self) -> &PrimaryKey {
        &self.inner.config.key
    }

    /// Returns the model configuration.
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.inner.config
    }

    /// Returns the backend table or collection name.
    #[must_use]
    pub fn source_name(&self) -> Arc<str> {
        self.inner.config.source()
    }

    /// Returns the bound source.
    #[must_use]
    pub fn source(&self) -> &Rc<dyn Source> {
        &self.inner.source
    }

    /// Returns true if both handles refer to the same model.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Describes the backing collection.
    ///
    /// # Errors
    ///
    /// Returns the source failure.
    pub fn schema(&self) -> Result<Schema> {
        self.inner.source.describe(&self.source_name())
    }

    /// Wraps a request in a query addressed to this model.
    #[must_use]
    pub fn query(&self, request: EntityRequest) -> Query {
        Query::new(self.inner.config.name.clone(), self.source_name(), request)
    }

    /// Executes a request against the source.
    ///
    /// # Errors
    ///
    /// Returns the source failure, annotated with the model and operation.
    pub fn execute(&self, request: EntityRequest) -> Result<Outcome> {
        let query = self.query(request);
        self.inner.source.execute(&query).map_err(|err| {
            let context = ErrorContext::new()
                .with_model(self.name())
                .with_operation(query.kind().to_string());
            err.with_context(context)
        })
    }

    /// Creates an unsaved entity bound to this model.
    #[must_use]
    pub fn create(&self, data: Row) -> Entity {
        Entity::new().with_model(self.clone()).with_data(data)
    }

    /// Turns a raw backend row into a persisted entity.
    ///
    /// # Errors
    ///
    /// Returns the failure of a strict cast.
    pub fn hydrate(&self, row: Row) -> Result<Entity> {
        let data = self
            .inner
            .source
            .cast(&self.source_name(), row, &self.cast_options())?;
        Ok(Entity::new()
            .with_model(self.clone())
            .with_data(data)
            .with_exists(true))
    }

    fn entity_set(&self, outcome: Outcome) -> Result<EntitySet> {
        match outcome {
            Outcome::Rows(cursor) => Ok(EntitySet::new(self.clone(), cursor)),
            Outcome::Record(Some(row)) => Ok(EntitySet::from_rows(Some(self.clone()), vec![row])),
            Outcome::Record(None) => Ok(EntitySet::new(self.clone(), Cursor::closed())),
            other => Err(Error::new(ErrorKind::Internal(format!(
                "read on {} returned {other:?}",
                self.name()
            )))),
        }
    }

    /// Reads every record matching `conditions` as a lazy set.
    ///
    /// # Errors
    ///
    /// Returns the source failure.
    pub fn find(&self, conditions: Row) -> Result<EntitySet> {
        let outcome = self.execute(EntityRequest::read(conditions))?;
        self.entity_set(outcome)
    }

    /// Reads the first record matching `conditions`.
    ///
    /// # Errors
    ///
    /// Returns the source failure.
    pub fn first(&self, conditions: Row) -> Result<Option<Entity>> {
        let outcome = self.execute(EntityRequest::Read {
            conditions,
            limit: Some(1),
        })?;
        let mut set = self.entity_set(outcome)?;
        Ok(set.next()?.cloned())
    }

    // ---------------------------------------------------------------------
    // Relationships
    // ---------------------------------------------------------------------

    /// Returns the relationship named `name`, inferring it on first use.
    ///
    /// Later calls with the same name return the memoised relationship and
    /// ignore `kind` and `config`.
    pub fn relationship(
        &self,
        kind: RelationKind,
        name: &str,
        config: RelationConfig,
    ) -> Rc<Relationship> {
        if let Some(existing) = self.relation(name) {
            return existing;
        }
        let relationship = Rc::new(self.inner.source.relationship(
            &self.inner.config,
            kind,
            name,
            config,
        ));
        self.inner
            .relationships
            .borrow_mut()
            .insert(name.into(), relationship.clone());
        relationship
    }

    /// Returns a previously defined relationship.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<Rc<Relationship>> {
        self.inner.relationships.borrow().get(name).cloned()
    }

    /// Returns the names of defined relationships in sorted order.
    #[must_use]
    pub fn relation_names(&self) -> Vec<Arc<str>> {
        self.inner.relationships.borrow().keys().cloned().collect()
    }

    /// Defines a relationship to `related` and links the two models.
    pub fn bind(
        &self,
        kind: RelationKind,
        name: &str,
        related: &Self,
        config: RelationConfig,
    ) -> Rc<Relationship> {
        let config = RelationConfig {
            to: config.to.or_else(|| Some(related.inner.config.name.clone())),
            related_key: config.related_key.or_else(|| Some(related.key().clone())),
            ..config
        };
        let relationship = self.relationship(kind, name, config);
        self.inner
            .links
            .borrow_mut()
            .insert(name.into(), Rc::downgrade(&related.inner));
        relationship
    }

    /// Defines a `hasMany` relationship to `related`.
    pub fn has_many(&self, name: &str, related: &Self) -> Rc<Relationship> {
        self.bind(RelationKind::HasMany, name, related, RelationConfig::new())
    }

    /// Defines a `hasOne` relationship to `related`.
    pub fn has_one(&self, name: &str, related: &Self) -> Rc<Relationship> {
        self.bind(RelationKind::HasOne, name, related, RelationConfig::new())
    }

    /// Defines a `belongsTo` relationship to `related`.
    pub fn belongs_to(&self, name: &str, related: &Self) -> Rc<Relationship> {
        self.bind(RelationKind::BelongsTo, name, related, RelationConfig::new())
    }

    /// Reads the records related to `owner` through `name` from `related`.
    ///
    /// An owner missing any owning-side key field has no related records.
    ///
    /// # Errors
    ///
    /// Fails if no relationship is named `name`, or with the source failure.
    pub fn related(&self, owner: &Entity, name: &str, related: &Self) -> Result<EntitySet> {
        let relationship = self
            .relation(name)
            .ok_or_else(|| Error::unbound_model(name))?;
        let data = owner.data().cloned().unwrap_or_default();

        let Some(query) = relationship.query(related.config(), &data) else {
            debug!(
                "event=related_read module=model status=skipped model={} relation={} reason=missing_key",
                self.name(),
                name
            );
            return Ok(EntitySet::new(related.clone(), Cursor::closed()));
        };
        let outcome = related.execute(query.request)?;
        related.entity_set(outcome)
    }

    /// Reads the records related to `owner` through a bound relationship.
    ///
    /// # Errors
    ///
    /// Fails if `name` was not bound to a live model, or with the source
    /// failure.
    pub fn fetch_related(&self, owner: &Entity, name: &str) -> Result<EntitySet> {
        let related = self
            .inner
            .links
            .borrow()
            .get(name)
            .and_then(Weak::upgrade)
            .map(|inner| Self { inner });
        match related {
            Some(related) => self.related(owner, name, &related),
            None => {
                let target = self
                    .relation(name)
                    .map_or_else(|| name.to_string(), |r| r.to.to_string());
                Err(Error::unknown_model(target))
            }
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .field("key", self.key())
            .field("source", &self.source_name())
            .finish_non_exhaustive()
    }
}
