//! Field schemas reported by sources.
//!
//! A [`Schema`] is what `describe` returns for a model: its fields in
//! declaration order, each with a type used to cast raw backend values.

use std::sync::Arc;

use strata_foundation::{Error, Key, Result, Row, Type, Value};

/// Schema definition for a stored field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name.
    pub name: Arc<str>,
    /// Field type.
    pub ty: Type,
    /// Maximum length for bounded columns.
    pub length: Option<usize>,
    /// Whether the field may hold nil.
    pub nullable: bool,
    /// Default value if not provided.
    pub default: Option<Value>,
}

impl FieldSchema {
    /// Creates a non-nullable field with no default.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            length: None,
            nullable: false,
            default: None,
        }
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Marks the field nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Casts a raw value to this field's type.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the value has no sensible conversion.
    pub fn cast(&self, value: &Value) -> Result<Value> {
        cast_value(value, &self.ty)
    }
}

/// Casts a raw backend value to `ty`.
///
/// Nil passes through unchanged. Textual numbers parse into numeric types,
/// numbers render into textual types, and `Any` accepts everything.
///
/// # Errors
///
/// Returns [`ErrorKind::TypeMismatch`](strata_foundation::ErrorKind) when no
/// conversion applies.
#[allow(clippy::cast_precision_loss)]
pub fn cast_value(value: &Value, ty: &Type) -> Result<Value> {
    if value.is_nil() || ty.accepts(&value.value_type()) {
        return Ok(match (ty, value) {
            (Type::Float, Value::Int(n)) => Value::Float(*n as f64),
            _ => value.clone(),
        });
    }

    let mismatch = || Error::type_mismatch(ty.clone(), value.value_type());
    match (ty, value) {
        (Type::Option(inner), _) => cast_value(value, inner),
        (Type::Int, Value::String(s)) => s.trim().parse().map(Value::Int).map_err(|_| mismatch()),
        (Type::Int, Value::Bool(b)) => Ok(Value::Int(i64::from(*b))),
        (Type::Float, Value::String(s)) => {
            s.trim().parse().map(Value::Float).map_err(|_| mismatch())
        }
        (Type::Bool, Value::Int(n)) => Ok(Value::Bool(*n != 0)),
        (Type::Bool, Value::String(s)) => match s.trim() {
            "1" | "true" | "t" | "yes" => Ok(Value::Bool(true)),
            "0" | "false" | "f" | "no" | "" => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
        (t, Value::Int(_) | Value::Float(_) | Value::Bool(_)) if t.is_textual() => {
            Ok(Value::from(value.to_string()))
        }
        (Type::Bytes, Value::String(s)) => Ok(Value::bytes(s.as_bytes())),
        _ => Err(mismatch()),
    }
}

/// Ordered set of field schemas for one model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    /// Field definitions in declaration order.
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    /// Returns field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| &*f.name)
    }

    /// Returns true if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Casts every declared field present in `row`.
    ///
    /// Undeclared fields pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails to cast.
    pub fn cast_row(&self, row: &Row) -> Result<Row> {
        let mut out = row.clone();
        for field in &self.fields {
            let key = Key::name(field.name.clone());
            if let Some(value) = row.get(&key) {
                out = out.insert(key, field.cast(value)?);
            }
        }
        Ok(out)
    }

    /// Fills declared defaults for fields missing from `row`.
    #[must_use]
    pub fn with_defaults(&self, row: &Row) -> Row {
        self.fields
            .iter()
            .filter_map(|f| f.default.as_ref().map(|d| (Key::name(f.name.clone()), d)))
            .fold(row.clone(), |acc, (key, default)| {
                if acc.contains_key(&key) {
                    acc
                } else {
                    acc.insert(key, default.clone())
                }
            })
    }
}
