//! Logical requests issued by models to sources.

use std::fmt;
use std::sync::Arc;

use strata_foundation::{Row, Value};

use crate::cursor::Cursor;

/// The CRUD operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Insert a new record.
    Create,
    /// Fetch matching records.
    Read,
    /// Modify matching records.
    Update,
    /// Remove matching records.
    Delete,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// An explicitly constructed operation and its payload.
///
/// Conditions are field-equality filters; an empty conditions row matches
/// every record.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRequest {
    /// Insert `data` as a new record.
    Create {
        /// Field values to store.
        data: Row,
    },
    /// Fetch records matching `conditions`.
    Read {
        /// Equality filters.
        conditions: Row,
        /// Maximum number of records, if bounded.
        limit: Option<usize>,
    },
    /// Overwrite `data` on records matching `conditions`.
    Update {
        /// Field values to store.
        data: Row,
        /// Equality filters.
        conditions: Row,
    },
    /// Remove records matching `conditions`.
    Delete {
        /// Equality filters.
        conditions: Row,
    },
}

impl EntityRequest {
    /// Creates an unbounded read.
    #[must_use]
    pub fn read(conditions: Row) -> Self {
        Self::Read {
            conditions,
            limit: None,
        }
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::Create { .. } => RequestKind::Create,
            Self::Read { .. } => RequestKind::Read,
            Self::Update { .. } => RequestKind::Update,
            Self::Delete { .. } => RequestKind::Delete,
        }
    }

    /// Returns the payload for writes.
    #[must_use]
    pub const fn data(&self) -> Option<&Row> {
        match self {
            Self::Create { data } | Self::Update { data, .. } => Some(data),
            Self::Read { .. } | Self::Delete { .. } => None,
        }
    }

    /// Returns the filters for reads, updates and deletes.
    #[must_use]
    pub const fn conditions(&self) -> Option<&Row> {
        match self {
            Self::Read { conditions, .. }
            | Self::Update { conditions, .. }
            | Self::Delete { conditions } => Some(conditions),
            Self::Create { .. } => None,
        }
    }

    /// Returns the row limit for reads.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        match self {
            Self::Read { limit, .. } => *limit,
            _ => None,
        }
    }
}

/// A request addressed to a model's backing collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Model name the request was issued for.
    pub model: Arc<str>,
    /// Backend table or collection name.
    pub source: Arc<str>,
    /// The operation and its payload.
    pub request: EntityRequest,
}

impl Query {
    /// Creates a query.
    #[must_use]
    pub fn new(model: impl Into<Arc<str>>, source: impl Into<Arc<str>>, request: EntityRequest) -> Self {
        Self {
            model: model.into(),
            source: source.into(),
            request,
        }
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        self.request.kind()
    }

    /// Returns the payload for writes.
    #[must_use]
    pub const fn data(&self) -> Option<&Row> {
        self.request.data()
    }

    /// Returns the filters for reads, updates and deletes.
    #[must_use]
    pub const fn conditions(&self) -> Option<&Row> {
        self.request.conditions()
    }
}

/// What a source returns for an executed query.
#[derive(Debug)]
pub enum Outcome {
    /// A record was created; `id` is the key the backend assigned.
    Created {
        /// Assigned identifier (nil when the backend assigns none).
        id: Value,
    },
    /// An update or delete touched this many records.
    Affected(usize),
    /// A single raw record (or none).
    Record(Option<Row>),
    /// A streaming cursor of raw records.
    Rows(Cursor),
}

impl Outcome {
    /// Returns the created identifier, if this is a create outcome.
    #[must_use]
    pub fn created_id(&self) -> Option<&Value> {
        match self {
            Self::Created { id } => Some(id),
            _ => None,
        }
    }

    /// Returns true if the operation touched anything.
    ///
    /// Cursors count as successful regardless of how many rows they yield.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Created { .. } | Self::Rows(_) => true,
            Self::Affected(n) => *n > 0,
            Self::Record(row) => row.is_some(),
        }
    }
}
