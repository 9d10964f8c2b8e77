//! Capabilities of collection items.

use strata_foundation::{Error, Key, Result, Value};

/// An item a [`Collection`](crate::Collection) can export and fan out over.
///
/// `to_value` gives the array form used by `to("array")` and every format
/// converter. `invoke` is the target of method fan-out; items that do not
/// handle a method fail with
/// [`ErrorKind::UnsupportedMethod`](strata_foundation::ErrorKind).
pub trait Element {
    /// Returns the array form of this item.
    fn to_value(&self) -> Value;

    /// Returns true if this item counts as non-empty.
    fn is_truthy(&self) -> bool {
        self.to_value().is_truthy()
    }

    /// Short description used in error messages.
    fn describe(&self) -> String {
        "item".to_string()
    }

    /// Calls a named method on this item.
    ///
    /// # Errors
    ///
    /// The default rejects every method as unsupported.
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let _ = args;
        Err(Error::unsupported_method(method, self.describe()))
    }
}

impl Element for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn is_truthy(&self) -> bool {
        Value::is_truthy(self)
    }

    fn describe(&self) -> String {
        self.value_type().to_string()
    }

    /// Scalars answer `count` and `is_nil`; maps also answer `get` with one
    /// key argument.
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        match (method, &*self) {
            ("is_nil", _) => Ok(Value::Bool(self.is_nil())),
            ("count", Value::Vec(v)) => Ok(Value::from(v.len())),
            ("count", Value::Map(m)) => Ok(Value::from(m.len())),
            ("count", Value::String(s)) => Ok(Value::from(s.chars().count())),
            ("get", Value::Map(m)) => {
                let key = args.first().and_then(Value::to_key);
                Ok(key
                    .and_then(|k: Key| m.get(&k).cloned())
                    .unwrap_or(Value::Nil))
            }
            _ => Err(Error::unsupported_method(method, self.describe())),
        }
    }
}
