//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Key, Type, Error, and persistent collections.

mod collections;
mod errors;
mod keys;
mod types;
mod values;
