//! Lazy sets of entities read from a cursor.
//!
//! An [`EntitySet`] pulls one raw row from its cursor per newly visited
//! position and hydrates it through the bound model. Visited positions are
//! kept, so rewinding and revisiting never touch the cursor again. Once the
//! cursor is exhausted it is dropped, which releases the backend resource.
//! A row that fails to hydrate stays pending and is retried on the next pull.

use log::debug;
use strata_foundation::{Result, Row, Value};
use strata_source::Cursor;

use crate::collection::{Collection, Invocation, InvokeOptions};
use crate::entity::Entity;
use crate::format::Format;
use crate::model::Model;

/// Entities materialized on demand from a cursor.
#[derive(Debug)]
pub struct EntitySet {
    model: Option<Model>,
    items: Collection<Entity>,
    cursor: Option<Cursor>,
    pending: Option<Row>,
    position: Option<usize>,
}

impl EntitySet {
    /// Creates a set reading `cursor` through `model`.
    #[must_use]
    pub fn new(model: Model, cursor: Cursor) -> Self {
        Self {
            model: Some(model),
            items: Collection::new(),
            cursor: Some(cursor),
            pending: None,
            position: None,
        }
    }

    /// Creates a set whose entities are bound to no model.
    #[must_use]
    pub fn detached(cursor: Cursor) -> Self {
        Self {
            model: None,
            items: Collection::new(),
            cursor: Some(cursor),
            pending: None,
            position: None,
        }
    }

    /// Creates a set over fixed rows.
    #[must_use]
    pub fn from_rows(model: Option<Model>, rows: Vec<Row>) -> Self {
        let cursor = Cursor::from(rows);
        match model {
            Some(model) => Self::new(model, cursor),
            None => Self::detached(cursor),
        }
    }

    /// Returns the bound model.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Returns the bound model's name.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(Model::name)
    }

    fn hydrate(&self, row: Row) -> Result<Entity> {
        match &self.model {
            Some(model) => model.hydrate(row),
            None => Ok(Entity::new().with_data(row).with_exists(true)),
        }
    }

    /// Takes the next raw row, pending first, then from the cursor.
    fn pull(&mut self) -> Result<Option<Row>> {
        if let Some(row) = self.pending.take() {
            return Ok(Some(row));
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        match cursor.next() {
            Some(row) => row.map(Some),
            None => {
                self.cursor = None;
                debug!(
                    "event=entity_set_exhausted module=entity_set status=ok model={} rows={}",
                    self.model_name().unwrap_or("-"),
                    self.items.len()
                );
                Ok(None)
            }
        }
    }

    /// Pulls rows until position `index` is materialized or the cursor ends.
    fn fill(&mut self, index: usize) -> Result<()> {
        while self.items.len() <= index {
            let Some(row) = self.pull()? else {
                break;
            };
            match self.hydrate(row.clone()) {
                Ok(entity) => {
                    self.items.append(entity);
                }
                Err(err) => {
                    debug!(
                        "event=entity_hydrate module=entity_set status=error model={} position={} error={}",
                        self.model_name().unwrap_or("-"),
                        self.items.len(),
                        err
                    );
                    self.pending = Some(row);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------

    /// Advances and returns the next entity.
    ///
    /// The first call yields the first entity. After the last one every call
    /// returns `None`.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<&Entity>> {
        let index = match self.position {
            None => 0,
            Some(i) if i < self.items.len() => i + 1,
            Some(i) => i,
        };
        self.fill(index)?;
        self.position = Some(index.min(self.items.len()));
        Ok(self.current())
    }

    /// Moves back to the first entity and returns it.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure if nothing was read yet.
    pub fn rewind(&mut self) -> Result<Option<&Entity>> {
        self.fill(0)?;
        self.position = Some(0);
        Ok(self.current())
    }

    /// Returns the entity at the traversal position.
    #[must_use]
    pub fn current(&self) -> Option<&Entity> {
        self.items.get_index(self.position?).map(|(_, e)| e)
    }

    /// Returns the traversal position while it is on an entity.
    #[must_use]
    pub fn key(&self) -> Option<usize> {
        self.current().and(self.position)
    }

    /// Returns true while the traversal position is on an entity.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.current().is_some()
    }

    /// Returns the entity at `index`, reading up to it if needed.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn get(&mut self, index: usize) -> Result<Option<&Entity>> {
        self.fill(index)?;
        Ok(self.items.get_index(index).map(|(_, e)| e))
    }

    // ---------------------------------------------------------------------
    // Materialization
    // ---------------------------------------------------------------------

    /// Reads every remaining row.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn materialize(&mut self) -> Result<&mut Self> {
        self.fill(usize::MAX)?;
        Ok(self)
    }

    /// Returns the number of entities materialized so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was materialized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total number of entities, reading the whole cursor.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn count(&mut self) -> Result<usize> {
        Ok(self.materialize()?.len())
    }

    /// Returns true once the cursor has been fully read and hydrated.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_none() && self.pending.is_none()
    }

    /// Returns the materialized entities as a collection, reading everything.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn collection(&mut self) -> Result<&Collection<Entity>> {
        self.materialize()?;
        Ok(&self.items)
    }

    /// Returns the array form of every entity.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn data(&mut self) -> Result<Value> {
        Ok(self.collection()?.to_array())
    }

    /// Exports every entity.
    ///
    /// Returns `Ok(None)` for a named format nobody registered.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn to(&mut self, format: impl Into<Format>) -> Result<Option<Value>> {
        Ok(self.collection()?.to(format))
    }

    /// Returns a fully read set of `f(entity)` bound to the same model.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn map(&mut self, f: impl FnMut(&Entity) -> Entity) -> Result<Self> {
        let items = self.collection()?.map(f);
        Ok(Self {
            model: self.model.clone(),
            items,
            cursor: None,
            pending: None,
            position: None,
        })
    }

    /// Transforms every entity into a value, keeping the model binding.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure.
    pub fn map_values(&mut self, f: impl FnMut(&Entity) -> Value) -> Result<Projection> {
        let values = self.collection()?.map(f);
        Ok(Projection {
            model: self.model.clone(),
            values,
        })
    }

    /// Calls `method` on every entity.
    ///
    /// # Errors
    ///
    /// Returns a cursor or hydration failure, or the first failing call.
    pub fn invoke(
        &mut self,
        method: &str,
        args: &[Value],
        options: InvokeOptions,
    ) -> Result<Invocation> {
        self.materialize()?;
        self.items.invoke(method, args, options)
    }

    /// Iterates entities from the start, reading lazily.
    ///
    /// Already materialized positions are served without touching the cursor.
    pub fn iter(&mut self) -> impl Iterator<Item = Result<Entity>> + '_ {
        let mut index = 0;
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            match self.get(index) {
                Ok(Some(entity)) => {
                    index += 1;
                    Some(Ok(entity.clone()))
                }
                Ok(None) => None,
                Err(err) => {
                    failed = true;
                    Some(Err(err))
                }
            }
        })
    }
}

/// Values derived from an entity set, still tagged with its model.
#[derive(Debug, Clone)]
pub struct Projection {
    model: Option<Model>,
    values: Collection<Value>,
}

impl Projection {
    /// Returns the model that produced the source entities.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Returns the derived values, keyed by entity position.
    #[must_use]
    pub fn values(&self) -> &Collection<Value> {
        &self.values
    }

    /// Returns the derived values.
    #[must_use]
    pub fn into_values(self) -> Collection<Value> {
        self.values
    }

    /// Exports the derived values; `None` for an unregistered format.
    #[must_use]
    pub fn to(&self, format: impl Into<Format>) -> Option<Value> {
        self.values.to(format)
    }
}
