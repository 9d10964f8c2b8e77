//! Single records bound to a model.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use log::debug;
use strata_foundation::{Error, Key, Result, Row, StVec, Value};
use strata_source::{EntityRequest, Outcome, PrimaryKey};

use crate::element::Element;
use crate::format::{Format, FormatOptions, Formats};
use crate::model::Model;

/// Validation messages attached to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorEntry {
    /// A single message.
    Message(Arc<str>),
    /// Several messages, in the order they were reported.
    Messages(Vec<Arc<str>>),
}

impl ErrorEntry {
    /// Returns every message in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        match self {
            Self::Message(message) => vec![&**message],
            Self::Messages(messages) => messages.iter().map(|m| &**m).collect(),
        }
    }

    /// Returns the array form: a string or a list of strings.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Message(message) => Value::String(message.clone()),
            Self::Messages(messages) => {
                Value::Vec(messages.iter().cloned().map(Value::String).collect::<StVec<_>>())
            }
        }
    }
}

impl From<&str> for ErrorEntry {
    fn from(message: &str) -> Self {
        Self::Message(message.into())
    }
}

impl From<String> for ErrorEntry {
    fn from(message: String) -> Self {
        Self::Message(message.into())
    }
}

impl From<Vec<&str>> for ErrorEntry {
    fn from(messages: Vec<&str>) -> Self {
        Self::Messages(messages.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ErrorEntry {
    fn from(messages: [&str; N]) -> Self {
        Self::Messages(messages.into_iter().map(Into::into).collect())
    }
}

/// Lifecycle of an entity relative to its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Never persisted.
    New,
    /// Persisted, with local changes not yet saved.
    Dirty,
    /// Persisted and unchanged since the last sync.
    Synced,
    /// Removed from the backend.
    Deleted,
}

/// Result of [`Entity::to`].
#[derive(Debug)]
pub enum EntityExport<'a> {
    /// The converted value.
    Value(Value),
    /// The format is unknown; the entity is handed back as is.
    Unchanged(&'a Entity),
}

impl EntityExport<'_> {
    /// Returns the converted value, if any.
    #[must_use]
    pub fn value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unchanged(_) => None,
        }
    }
}

/// A single record.
///
/// Field access never fails: unset fields read as absent. Errors are kept in
/// a per-field bag and never change the data or the `exists` flag.
#[derive(Clone, Default)]
pub struct Entity {
    model: Option<Model>,
    data: Option<Row>,
    exists: bool,
    deleted: bool,
    errors: BTreeMap<Arc<str>, ErrorEntry>,
    modified: BTreeSet<Key>,
}

impl Entity {
    /// Creates an unbound entity with no data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the entity to a model.
    #[must_use]
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the initial data without marking fields as modified.
    #[must_use]
    pub fn with_data(mut self, data: Row) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets whether the entity is already persisted.
    #[must_use]
    pub fn with_exists(mut self, exists: bool) -> Self {
        self.exists = exists;
        self
    }

    /// Returns the bound model.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Returns the primary key shape of the bound model (`id` when unbound).
    #[must_use]
    pub fn key(&self) -> PrimaryKey {
        self.model
            .as_ref()
            .map_or_else(PrimaryKey::default, |m| m.key().clone())
    }

    // ---------------------------------------------------------------------
    // Data
    // ---------------------------------------------------------------------

    /// Sets one field.
    pub fn set(&mut self, field: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        let field = field.into();
        let data = self.data.take().unwrap_or_default();
        self.data = Some(data.insert(field.clone(), value.into()));
        self.modified.insert(field);
        self
    }

    /// Sets every field of `data`.
    pub fn set_all(&mut self, data: &Row) -> &mut Self {
        for (field, value) in data.iter() {
            self.set(field, value.clone());
        }
        self
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: impl Into<Key>) -> Option<&Value> {
        self.data.as_ref()?.get(&field.into())
    }

    /// Returns true if a field is set to a non-nil value.
    #[must_use]
    pub fn has(&self, field: impl Into<Key>) -> bool {
        self.get(field).is_some_and(|v| !v.is_nil())
    }

    /// Returns the data, or `None` if nothing was ever set.
    #[must_use]
    pub fn data(&self) -> Option<&Row> {
        self.data.as_ref()
    }

    /// Returns the fields changed since the last sync.
    pub fn modified(&self) -> impl Iterator<Item = &Key> {
        self.modified.iter()
    }

    // ---------------------------------------------------------------------
    // Errors
    // ---------------------------------------------------------------------

    /// Returns the error bag.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<Arc<str>, ErrorEntry> {
        &self.errors
    }

    /// Merges entries into the error bag and returns the whole bag.
    pub fn set_errors<I, K, E>(&mut self, errors: I) -> &BTreeMap<Arc<str>, ErrorEntry>
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<Arc<str>>,
        E: Into<ErrorEntry>,
    {
        for (field, entry) in errors {
            self.errors.insert(field.into(), entry.into());
        }
        &self.errors
    }

    /// Returns the errors reported for one field.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&ErrorEntry> {
        self.errors.get(field)
    }

    /// Returns the errors for one field, or `default` when there are none.
    #[must_use]
    pub fn error_or(&self, field: &str, default: impl Into<ErrorEntry>) -> ErrorEntry {
        self.error(field).cloned().unwrap_or_else(|| default.into())
    }

    /// Returns true if any field has errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    // ---------------------------------------------------------------------
    // Persistence state
    // ---------------------------------------------------------------------

    /// Returns true if the entity is persisted.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Marks the entity as persisted under `id`.
    ///
    /// Single keys take `id` directly; composite keys take each field from a
    /// map. A nil id keeps the current key fields.
    pub fn sync(&mut self, id: impl Into<Value>) -> &mut Self {
        let id = id.into();
        let mut data = self.data.take().unwrap_or_default();
        match (self.key(), &id) {
            (_, Value::Nil) => {}
            (PrimaryKey::Single(field), _) => data = data.insert(Key::from(field), id.clone()),
            (PrimaryKey::Composite(fields), Value::Map(parts)) => {
                for field in fields {
                    let key = Key::from(field);
                    if let Some(value) = parts.get(&key) {
                        data = data.insert(key, value.clone());
                    }
                }
            }
            (PrimaryKey::Composite(fields), _) => {
                if let Some(field) = fields.first() {
                    data = data.insert(Key::from(field.clone()), id.clone());
                }
            }
        }
        self.data = Some(data);
        self.exists = true;
        self.deleted = false;
        self.modified.clear();
        self
    }

    /// Returns the identifier, if every key field is set.
    #[must_use]
    pub fn id(&self) -> Option<Value> {
        self.key().extract(self.data.as_ref()?)
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        if self.deleted {
            EntityState::Deleted
        } else if !self.exists {
            EntityState::New
        } else if self.modified.is_empty() {
            EntityState::Synced
        } else {
            EntityState::Dirty
        }
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Exports the entity using the shared format registry.
    #[must_use]
    pub fn to(&self, format: impl Into<Format>) -> EntityExport<'_> {
        self.export(format, &Formats::Shared)
    }

    /// Exports the entity using `formats` for named formats.
    #[must_use]
    pub fn export(&self, format: impl Into<Format>, formats: &Formats) -> EntityExport<'_> {
        let options = FormatOptions::default();
        let converted = match format.into() {
            Format::Array => Some(Element::to_value(self)),
            Format::Named(name) => formats.convert(&name, &Element::to_value(self), &options),
            Format::With(converter) => converter(&Element::to_value(self), &options),
        };
        converted.map_or(EntityExport::Unchanged(self), EntityExport::Value)
    }

    // ---------------------------------------------------------------------
    // Model-forwarded operations
    // ---------------------------------------------------------------------

    fn bound(&self, method: &str) -> Result<Model> {
        self.model
            .clone()
            .ok_or_else(|| Error::unbound_model(method))
    }

    fn key_conditions(&self, model: &Model) -> Result<Row> {
        let data = self.data.clone().unwrap_or_default();
        let mut conditions = Row::new();
        for field in model.key().fields() {
            let key = Key::from(field);
            let value = data
                .get(&key)
                .filter(|v| !v.is_nil())
                .ok_or_else(|| Error::missing_key(model.name(), field))?;
            conditions = conditions.insert(key, value.clone());
        }
        Ok(conditions)
    }

    /// Runs an explicit request against the bound model.
    ///
    /// # Errors
    ///
    /// Returns [`UnboundModel`](strata_foundation::ErrorKind::UnboundModel)
    /// without a model, or the backend failure.
    pub fn request(&self, request: EntityRequest) -> Result<Outcome> {
        let model = self.bound(&request.kind().to_string())?;
        model.execute(request)
    }

    /// Applies `data` and persists the entity, returning the backend outcome.
    ///
    /// New entities are created and synced to the identifier the backend
    /// assigns; persisted entities send their modified fields as an update.
    /// Use [`Outcome::succeeded`] for a yes/no answer.
    ///
    /// # Errors
    ///
    /// Fails without a bound model, when a persisted entity lacks a key
    /// field, or when the backend fails.
    pub fn save(&mut self, data: Option<Row>) -> Result<Outcome> {
        if let Some(data) = data {
            self.set_all(&data);
        }
        let model = self.bound("save")?;
        let row = self.data.clone().unwrap_or_default();

        let outcome = if self.exists {
            let conditions = self.key_conditions(&model)?;
            let changes = if self.modified.is_empty() {
                row
            } else {
                row.select(|k| self.modified.contains(k))
            };
            model.execute(EntityRequest::Update {
                data: changes,
                conditions,
            })?
        } else {
            model.execute(EntityRequest::Create { data: row })?
        };

        match &outcome {
            Outcome::Created { id } => {
                self.sync(id.clone());
            }
            other if other.succeeded() => self.modified.clear(),
            _ => {}
        }
        debug!(
            "event=entity_save module=entity status=ok model={} saved={} exists={}",
            model.name(),
            outcome.succeeded(),
            self.exists
        );
        Ok(outcome)
    }

    /// Removes the entity from its backend.
    ///
    /// Entities that were never persisted are left alone and report `false`.
    ///
    /// # Errors
    ///
    /// Fails without a bound model, when a key field is missing, or when the
    /// backend fails.
    pub fn delete(&mut self) -> Result<bool> {
        let model = self.bound("delete")?;
        if !self.exists {
            return Ok(false);
        }
        let conditions = self.key_conditions(&model)?;
        let deleted = model
            .execute(EntityRequest::Delete { conditions })?
            .succeeded();
        if deleted {
            self.exists = false;
            self.deleted = true;
        }
        Ok(deleted)
    }

    /// Calls an operation by name.
    ///
    /// Handles `exists`, `id`, `data`, `errors`, `save`, `delete` and `sync`,
    /// then relationships bound on the model. Anything else fails with
    /// [`UnboundModel`](strata_foundation::ErrorKind::UnboundModel).
    ///
    /// # Errors
    ///
    /// Returns the failure of the dispatched operation.
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match method {
            "exists" => Ok(Value::Bool(self.exists)),
            "id" => Ok(self.id().unwrap_or(Value::Nil)),
            "data" => Ok(Element::to_value(self)),
            "errors" => Ok(Value::Map(
                self.errors
                    .iter()
                    .map(|(k, v)| (Key::from(k.clone()), v.to_value()))
                    .collect(),
            )),
            "save" => {
                let data = args.first().and_then(Value::as_map).cloned();
                self.save(data).map(|outcome| Value::Bool(outcome.succeeded()))
            }
            "delete" => self.delete().map(Value::Bool),
            "sync" => {
                self.sync(args.first().cloned().unwrap_or(Value::Nil));
                Ok(Value::Bool(true))
            }
            _ => self.call_related(method),
        }
    }

    fn call_related(&self, name: &str) -> Result<Value> {
        let model = self.bound(name)?;
        let relationship = model
            .relation(name)
            .ok_or_else(|| Error::unbound_model(name))?;
        let mut related = model.fetch_related(self, name)?;
        if relationship.kind.is_singular() {
            Ok(related
                .next()?
                .map_or(Value::Nil, Element::to_value))
        } else {
            related.data()
        }
    }
}

impl Element for Entity {
    fn to_value(&self) -> Value {
        Value::Map(self.data.clone().unwrap_or_default())
    }

    fn is_truthy(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.is_empty())
    }

    fn describe(&self) -> String {
        self.model
            .as_ref()
            .map_or_else(|| "entity".to_string(), |m| format!("{} entity", m.name()))
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        self.call(method, args)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.model.as_ref().map(Model::name) == other.model.as_ref().map(Model::name)
            && self.data == other.data
            && self.exists == other.exists
            && self.errors == other.errors
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("model", &self.model.as_ref().map(Model::name))
            .field("data", &self.data)
            .field("exists", &self.exists)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
