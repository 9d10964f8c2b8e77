//! Error types for the Strata system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Absent data (unset fields, exhausted cursors, unknown formats) is never an
//! error; only failed operations are.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Strata operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an error for a method call that no bound model can handle.
    #[must_use]
    pub fn unbound_model(method: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundModel {
            method: method.into(),
        })
    }

    /// Creates an error for an item that lacks a fanned-out method.
    #[must_use]
    pub fn unsupported_method(method: impl Into<String>, item: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMethod {
            method: method.into(),
            item: item.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unknown model error.
    #[must_use]
    pub fn unknown_model(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownModel(name.into()))
    }

    /// Creates a missing key error.
    #[must_use]
    pub fn missing_key(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingKey {
            model: model.into(),
            field: field.into(),
        })
    }

    /// Creates a backend failure error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Source(message.into()))
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A model-bound operation was requested on an entity without a model,
    /// or a dynamic call named nothing the entity or its model handles.
    #[error("No model bound or unhandled method call `{method}`.")]
    UnboundModel {
        /// The requested method name.
        method: String,
    },

    /// A collection fan-out reached an item lacking the method.
    #[error("unsupported method `{method}` on {item}")]
    UnsupportedMethod {
        /// The requested method name.
        method: String,
        /// Description of the item that could not handle it.
        item: String,
    },

    /// Type mismatch while casting a field.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// A source was asked about a model it does not know.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A primary key field is missing from a record.
    #[error("missing key field `{field}` on model {model}")]
    MissingKey {
        /// The model whose key is incomplete.
        model: String,
        /// The missing key field.
        field: String,
    },

    /// The backend reported a failure.
    #[error("source error: {0}")]
    Source(String),

    /// Converting a value to or from a wire format failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Model the failing operation was bound to.
    pub model: Option<String>,
    /// Operation that failed (`create`, `read`, a method name, ...).
    pub operation: Option<String>,
    /// Call chain leading to the failure, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: None,
            operation: None,
            stack: Vec::new(),
        }
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.model, &self.operation) {
            (Some(model), Some(op)) => write!(f, "in {model}::{op}")?,
            (Some(model), None) => write!(f, "in {model}")?,
            (None, Some(op)) => write!(f, "in {op}")?,
            (None, None) => {}
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
