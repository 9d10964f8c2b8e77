//! Strata - backend-agnostic data mapper
//!
//! This crate re-exports all layers of the Strata system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: strata_mapper     - Collection, Entity, EntitySet, Model, formats
//! Layer 1: strata_source     - Source contract, Cursor, queries, relationships
//! Layer 0: strata_foundation - Core types (Value, Key, Error)
//! ```

pub use strata_foundation as foundation;
pub use strata_mapper as mapper;
pub use strata_source as source;
