//! In-process source backed by plain row tables.
//!
//! `MemorySource` implements the full [`Source`] contract without I/O. Reads
//! stream through a real [`Cursor`], every executed query is journaled, and
//! rows are cast through the table schema during hydration, so the mapper
//! exercises the same paths it would against a database.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use strata_foundation::{Error, Key, Result, Row, Value};

use crate::cursor::VecRows;
use crate::query::{Outcome, Query};
use crate::schema::Schema;
use crate::source::{CastOptions, Source};

#[derive(Debug, Default)]
struct Table {
    schema: Schema,
    rows: Vec<Row>,
    next_id: i64,
}

impl Table {
    fn matching(&self, conditions: &Row) -> impl Iterator<Item = (usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.satisfies(conditions))
    }
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<Arc<str>, Table>,
    journal: Vec<Query>,
    failure: Option<String>,
}

/// Source holding tables in memory.
#[derive(Debug, Default)]
pub struct MemorySource {
    state: RefCell<State>,
    id_field: Option<Arc<str>>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field receiving auto-assigned identifiers (default `id`).
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<Arc<str>>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Declares a table and its schema.
    #[must_use]
    pub fn with_table(self, name: impl Into<Arc<str>>, schema: Schema) -> Self {
        self.state
            .borrow_mut()
            .tables
            .entry(name.into())
            .or_default()
            .schema = schema;
        self
    }

    /// Appends raw rows to a table without journaling.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Row>) {
        let mut state = self.state.borrow_mut();
        let table = state.tables.entry(table.into()).or_default();
        for row in rows {
            if let Some(id) = row.get(&self.id_key()).and_then(Value::as_int) {
                table.next_id = table.next_id.max(id);
            }
            table.rows.push(row);
        }
    }

    /// Returns a snapshot of a table's rows.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state
            .borrow()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Returns every query executed so far, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<Query> {
        self.state.borrow().journal.clone()
    }

    /// Makes the next operation fail with a backend error.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state.borrow_mut().failure = Some(message.into());
    }

    fn id_key(&self) -> Key {
        Key::name(self.id_field.clone().unwrap_or_else(|| "id".into()))
    }

    /// Journals the query and surfaces any injected failure.
    fn record(&self, query: &Query) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.journal.push(query.clone());
        match state.failure.take() {
            Some(message) => {
                debug!(
                    "event=memory_query module=memory status=error source={} kind={} error={}",
                    query.source,
                    query.kind(),
                    message
                );
                Err(Error::backend(message))
            }
            None => Ok(()),
        }
    }
}

impl Source for MemorySource {
    fn describe(&self, entity: &str) -> Result<Schema> {
        self.state
            .borrow()
            .tables
            .get(entity)
            .map(|t| t.schema.clone())
            .ok_or_else(|| Error::unknown_model(entity))
    }

    fn create(&self, query: &Query) -> Result<Outcome> {
        self.record(query)?;
        let id_key = self.id_key();
        let mut data = query.data().cloned().unwrap_or_default();

        let mut state = self.state.borrow_mut();
        let table = state.tables.entry(query.source.clone()).or_default();
        data = table.schema.with_defaults(&data);

        let existing = data.get(&id_key).filter(|v| !v.is_nil()).cloned();
        let id = match existing {
            Some(id) => {
                if let Some(n) = id.as_int() {
                    table.next_id = table.next_id.max(n);
                }
                id
            }
            None => {
                table.next_id += 1;
                let id = Value::Int(table.next_id);
                data = data.insert(id_key, id.clone());
                id
            }
        };
        table.rows.push(data);
        Ok(Outcome::Created { id })
    }

    fn read(&self, query: &Query) -> Result<Outcome> {
        self.record(query)?;
        let conditions = query.conditions().cloned().unwrap_or_default();
        let limit = query.request.limit().unwrap_or(usize::MAX);

        let found: Vec<Row> = self
            .state
            .borrow()
            .tables
            .get(&query.source)
            .map(|t| {
                t.matching(&conditions)
                    .take(limit)
                    .map(|(_, row)| row.clone())
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            "event=memory_read module=memory status=ok source={} rows={}",
            query.source,
            found.len()
        );
        Ok(Outcome::Rows(self.result(Box::new(VecRows::new(found)))))
    }

    fn update(&self, query: &Query) -> Result<Outcome> {
        self.record(query)?;
        let conditions = query.conditions().cloned().unwrap_or_default();
        let data = query.data().cloned().unwrap_or_default();

        let mut state = self.state.borrow_mut();
        let Some(table) = state.tables.get_mut(&query.source) else {
            return Ok(Outcome::Affected(0));
        };
        let hits: Vec<usize> = table.matching(&conditions).map(|(i, _)| i).collect();
        for &i in &hits {
            table.rows[i] = table.rows[i].merge(&data);
        }
        Ok(Outcome::Affected(hits.len()))
    }

    fn delete(&self, query: &Query) -> Result<Outcome> {
        self.record(query)?;
        let conditions = query.conditions().cloned().unwrap_or_default();

        let mut state = self.state.borrow_mut();
        let Some(table) = state.tables.get_mut(&query.source) else {
            return Ok(Outcome::Affected(0));
        };
        let before = table.rows.len();
        table.rows.retain(|row| !row.satisfies(&conditions));
        Ok(Outcome::Affected(before - table.rows.len()))
    }

    fn cast(&self, entity: &str, row: Row, options: &CastOptions) -> Result<Row> {
        let state = self.state.borrow();
        let Some(table) = state.tables.get(entity) else {
            return Ok(row);
        };
        let schema = &table.schema;

        let row = if options.defaults {
            schema.with_defaults(&row)
        } else {
            row
        };
        if options.strict {
            return schema.cast_row(&row);
        }

        let mut out = row.clone();
        for field in &schema.fields {
            let key = Key::name(field.name.clone());
            if let Some(Ok(value)) = row.get(&key).map(|v| field.cast(v)) {
                out = out.insert(key, value);
            }
        }
        Ok(out)
    }
}
