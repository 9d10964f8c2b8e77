//! Source contract, lazy cursors, queries, and relationship inference for Strata.
//!
//! This crate provides:
//! - [`Cursor`] - Single-pass lazy sequence of raw backend rows
//! - [`Source`] - The backend contract (describe, CRUD, cast, relationships)
//! - [`Query`] / [`EntityRequest`] - Explicit logical requests
//! - [`Schema`] - Field descriptions used to cast raw rows
//! - [`ModelConfig`] - Per-model metadata
//! - [`Relationship`] - Associations with inferred key mappings
//! - [`MemorySource`] - In-process backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cursor;
pub mod inflector;
pub mod memory;
pub mod model;
pub mod query;
pub mod relationship;
pub mod schema;
pub mod source;

pub use cursor::{Cursor, RowSource, VecRows};
pub use memory::MemorySource;
pub use model::{ModelConfig, PrimaryKey};
pub use query::{EntityRequest, Outcome, Query, RequestKind};
pub use relationship::{KeyMap, RelationConfig, RelationKind, Relationship};
pub use schema::{FieldSchema, Schema, cast_value};
pub use source::{CastOptions, Source};
