//! Export format registry.
//!
//! A [`FormatRegistry`] maps format names (`json`, `msgpack`, ...) to
//! converter functions. Every converter receives the array form of the
//! exported collection or entity and returns the converted value, or `None`
//! when it cannot convert.
//!
//! Collections either carry their own registry ([`Formats::Owned`]) or consult
//! the process-wide one ([`Formats::Shared`]) at conversion time, so changes
//! made through [`register_shared`] and [`clear_shared`] are seen by every
//! collection created before them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::warn;
use once_cell::sync::Lazy;
use strata_foundation::{Error, Result, Value};

/// Options passed through to converters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Produce human-readable output where the format allows it.
    pub pretty: bool,
}

impl FormatOptions {
    /// Creates default options.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: false }
    }

    /// Sets pretty output.
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// A converter from array form to an export format.
pub type Converter = Arc<dyn Fn(&Value, &FormatOptions) -> Option<Value> + Send + Sync>;

/// Wraps a closure as a [`Converter`].
pub fn converter<F>(f: F) -> Converter
where
    F: Fn(&Value, &FormatOptions) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Serializes a value to a JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(value: &Value, options: &FormatOptions) -> Result<String> {
    let encoded = if options.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    encoded.map_err(|e| Error::serialization(e.to_string()))
}

/// Serializes a value to `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_msgpack(value: &Value) -> Result<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| Error::serialization(e.to_string()))
}

fn json_converter(value: &Value, options: &FormatOptions) -> Option<Value> {
    match to_json(value, options) {
        Ok(s) => Some(Value::from(s)),
        Err(err) => {
            warn!("event=format_convert module=format status=error format=json error={err}");
            None
        }
    }
}

fn msgpack_converter(value: &Value, _options: &FormatOptions) -> Option<Value> {
    match to_msgpack(value) {
        Ok(bytes) => Some(Value::bytes(bytes)),
        Err(err) => {
            warn!("event=format_convert module=format status=error format=msgpack error={err}");
            None
        }
    }
}

/// Named export converters.
#[derive(Clone, Default)]
pub struct FormatRegistry {
    converters: BTreeMap<String, Converter>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the `json` and `msgpack` converters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("json", converter(json_converter));
        registry.register("msgpack", converter(msgpack_converter));
        registry
    }

    /// Registers (or replaces) a converter.
    pub fn register(&mut self, name: impl Into<String>, converter: Converter) {
        self.converters.insert(name.into(), converter);
    }

    /// Removes a converter, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Converter> {
        self.converters.remove(name)
    }

    /// Removes every converter.
    pub fn clear(&mut self) {
        self.converters.clear();
    }

    /// Returns a converter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Converter> {
        self.converters.get(name).cloned()
    }

    /// Returns true if a converter is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Returns registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.converters.keys().cloned().collect()
    }

    /// Returns the number of converters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Returns true if no converters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Converts `value` with the named converter.
    ///
    /// Returns `None` for unknown formats.
    #[must_use]
    pub fn convert(&self, name: &str, value: &Value, options: &FormatOptions) -> Option<Value> {
        self.get(name).and_then(|c| c(value, options))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.converters.keys().collect::<Vec<_>>())
            .finish()
    }
}

static SHARED: Lazy<RwLock<FormatRegistry>> =
    Lazy::new(|| RwLock::new(FormatRegistry::with_defaults()));

/// Registers a converter in the process-wide registry.
pub fn register_shared(name: impl Into<String>, converter: Converter) {
    SHARED
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, converter);
}

/// Removes one converter from the process-wide registry.
pub fn remove_shared(name: &str) -> Option<Converter> {
    SHARED
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(name)
}

/// Removes every converter from the process-wide registry.
pub fn clear_shared() {
    SHARED.write().unwrap_or_else(PoisonError::into_inner).clear();
}

/// Restores the process-wide registry to its defaults.
pub fn reset_shared() {
    *SHARED.write().unwrap_or_else(PoisonError::into_inner) = FormatRegistry::with_defaults();
}

/// Returns a converter from the process-wide registry.
#[must_use]
pub fn shared_converter(name: &str) -> Option<Converter> {
    SHARED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
}

/// Where a collection looks up named formats.
#[derive(Clone, Debug, Default)]
pub enum Formats {
    /// The process-wide registry, consulted on every conversion.
    #[default]
    Shared,
    /// A registry owned by the collection (and its derivatives).
    Owned(Arc<FormatRegistry>),
}

impl Formats {
    /// Wraps a registry as an owned format set.
    #[must_use]
    pub fn owned(registry: FormatRegistry) -> Self {
        Self::Owned(Arc::new(registry))
    }

    /// Returns the converter registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Converter> {
        match self {
            Self::Shared => shared_converter(name),
            Self::Owned(registry) => registry.get(name),
        }
    }

    /// Converts `value` with the named converter.
    #[must_use]
    pub fn convert(&self, name: &str, value: &Value, options: &FormatOptions) -> Option<Value> {
        // The shared lock is released before the converter runs.
        self.get(name).and_then(|c| c(value, options))
    }
}

/// Target of a `to` export.
#[derive(Clone)]
pub enum Format {
    /// The plain array form.
    Array,
    /// A converter looked up by name.
    Named(String),
    /// An ad-hoc converter.
    With(Converter),
}

impl From<&str> for Format {
    fn from(name: &str) -> Self {
        if name == "array" {
            Self::Array
        } else {
            Self::Named(name.to_string())
        }
    }
}

impl From<String> for Format {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Converter> for Format {
    fn from(converter: Converter) -> Self {
        Self::With(converter)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array => write!(f, "Array"),
            Self::Named(name) => write!(f, "Named({name:?})"),
            Self::With(_) => write!(f, "With(<converter>)"),
        }
    }
}
