//! Type descriptors for backend field schemas.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type descriptor for a stored field.
///
/// Backends report these from `describe`; sources use them to cast raw
/// column values into typed [`Value`](crate::Value)s during hydration.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type (only value: nil).
    Nil,
    /// Boolean type.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point.
    Float,
    /// Short string type (bounded length columns).
    String,
    /// Long text type.
    Text,
    /// Date/time stored in its textual backend form.
    DateTime,
    /// Raw bytes.
    Bytes,
    /// Homogeneous vector type.
    Vec(Box<Type>),
    /// Map with typed keys and values.
    Map(Box<Type>, Box<Type>),
    /// Optional type (value or nil).
    Option(Box<Type>),
    /// Any type (accepts any value).
    Any,
}

impl Type {
    /// Creates a vector type with the given element type.
    #[must_use]
    pub fn vec(element: Type) -> Self {
        Self::Vec(Box::new(element))
    }

    /// Creates a map type with the given key and value types.
    #[must_use]
    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Creates an optional type.
    #[must_use]
    pub fn option(inner: Type) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Parses a backend column type name.
    ///
    /// Unknown names map to [`Type::Any`] so an unfamiliar column never
    /// blocks hydration.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "bigint" | "serial" => {
                Self::Int
            }
            "float" | "double" | "real" | "decimal" | "numeric" => Self::Float,
            "char" | "varchar" | "string" | "id" => Self::String,
            "text" | "tinytext" | "mediumtext" | "longtext" => Self::Text,
            "date" | "time" | "datetime" | "timestamp" => Self::DateTime,
            "blob" | "binary" | "varbinary" | "bytes" => Self::Bytes,
            "null" | "nil" => Self::Nil,
            _ => Self::Any,
        }
    }

    /// Returns true if this type is `Any`.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns true if this type can be nil.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nil | Self::Option(_) | Self::Any)
    }

    /// Returns true if values of this type are stored as strings.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Text | Self::DateTime)
    }

    /// Checks if a value type is accepted by this type.
    ///
    /// - `Any` accepts all types
    /// - `Option(T)` accepts `Nil` and any type that `T` accepts
    /// - Textual types accept each other
    /// - Collection types check element types recursively
    #[must_use]
    pub fn accepts(&self, value_type: &Type) -> bool {
        if matches!(self, Self::Any) {
            return true;
        }

        if let Self::Option(inner) = self {
            return matches!(value_type, Self::Nil) || inner.accepts(value_type);
        }

        match (self, value_type) {
            (Self::Nil, Self::Nil)
            | (Self::Bool, Self::Bool)
            | (Self::Int | Self::Float, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::Bytes, Self::Bytes) => true,
            (a, b) if a.is_textual() && b.is_textual() => true,
            (Self::Vec(expected), Self::Vec(actual)) => {
                actual.is_any() || expected.accepts(actual)
            }
            (Self::Map(expected_k, expected_v), Self::Map(actual_k, actual_v)) => {
                (actual_k.is_any() && actual_v.is_any())
                    || (expected_k.accepts(actual_k) && expected_v.accepts(actual_v))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Text => write!(f, "text"),
            Self::DateTime => write!(f, "datetime"),
            Self::Bytes => write!(f, "bytes"),
            Self::Vec(t) => write!(f, "vec<{t:?}>"),
            Self::Map(k, v) => write!(f, "map<{k:?}, {v:?}>"),
            Self::Option(t) => write!(f, "option<{t:?}>"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
