//! Integration tests for Layer 2: Mapper
//!
//! Tests for collections, format export, entities, and lazy entity sets.

mod collections;
mod entity_sets;
mod formats;
