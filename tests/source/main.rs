//! Integration tests for Layer 1: Source
//!
//! Tests for cursors, relationship inference, schemas, and the in-memory
//! source.

mod cursors;
mod inflection;
mod memory;
