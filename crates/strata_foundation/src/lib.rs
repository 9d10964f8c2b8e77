//! Core values, keys, errors, and persistent collections for Strata.
//!
//! This crate provides:
//! - [`Value`] - The dynamic value type carried by every record field
//! - [`Key`] - Index-or-name keys for rows and collections
//! - [`Type`] - Field type descriptors reported by backends
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`StVec`], [`StMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod key;
pub mod types;
pub mod value;

pub use collections::{StMap, StVec};
pub use error::{Error, ErrorContext, ErrorKind};
pub use key::Key;
pub use types::Type;
pub use value::{Row, Value, row};

/// Result type for Strata operations.
pub type Result<T> = std::result::Result<T, Error>;
