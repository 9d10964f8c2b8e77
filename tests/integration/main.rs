//! Cross-layer integration tests for Strata
//!
//! Tests that verify correct interaction between the source and mapper
//! layers.

mod documents;
mod registry;
