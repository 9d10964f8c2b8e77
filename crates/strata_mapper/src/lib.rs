//! Collections, entities, and lazy entity sets for Strata.
//!
//! This crate provides:
//! - [`Collection`] - Ordered, keyed sequences with traversal, fan-out and export
//! - [`Element`] - What a collection item can do when fanned out over
//! - [`FormatRegistry`] - Named export converters (`json`, `msgpack`, ...)
//! - [`Entity`] - A single record bound to a [`Model`]
//! - [`EntitySet`] - Entities hydrated lazily from a source cursor
//! - [`Projection`] - Values derived from an entity set, tagged with its model
//! - [`Model`] - A model configuration bound to a source
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use strata_foundation::{Row, Value, row};
//! use strata_mapper::Model;
//! use strata_source::{MemorySource, ModelConfig};
//!
//! let source = Rc::new(MemorySource::new());
//! let posts = Model::new(ModelConfig::new("Post"), source);
//!
//! let mut post = posts.create(row([("title", "Hello")]));
//! post.save(None).unwrap();
//! assert_eq!(post.id(), Some(Value::Int(1)));
//!
//! let mut all = posts.find(Row::new()).unwrap();
//! assert_eq!(all.count().unwrap(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod element;
pub mod entity;
pub mod entity_set;
pub mod format;
pub mod model;

pub use collection::{Collection, Comparator, Invocation, InvokeOptions};
pub use element::Element;
pub use entity::{Entity, EntityExport, EntityState, ErrorEntry};
pub use entity_set::{EntitySet, Projection};
pub use format::{Converter, Format, FormatOptions, FormatRegistry, Formats, converter};
pub use model::Model;
