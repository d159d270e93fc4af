//! Fluent conversion of a single value
//!
//! ```
//! use recast_core::{Value, ValueFormatter};
//!
//! let phone = ValueFormatter::new("tel: 123.456.7890")
//!     .call("onlyNumbers", &[])?
//!     .call("phone", &[])?
//!     .into_value();
//! assert_eq!(phone, Value::from("(123)456-7890"));
//! # Ok::<(), recast_core::Error>(())
//! ```

use crate::engine::Converter;
use crate::error::Result;
use crate::value::Value;
use std::fmt;

/// A value plus the converter that runs named steps on it
#[derive(Debug, Clone)]
pub struct ValueFormatter {
    value: Value,
    converter: Converter,
}

impl ValueFormatter {
    /// Wrap a value; the empty string is stored as `Null`
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_converter(value, Converter::new())
    }

    pub fn with_converter(value: impl Into<Value>, converter: Converter) -> Self {
        Self {
            value: value.into().normalize_blank(),
            converter,
        }
    }

    /// Apply one named step, leaf-wise
    pub fn call(self, name: &str, args: &[&str]) -> Result<Self> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let value = self.converter.call(name, self.value, &args)?;
        Ok(Self {
            value,
            converter: self.converter,
        })
    }

    pub fn get(&self) -> &Value {
        &self.value
    }

    /// First element of an array value, otherwise the value itself
    pub fn first(&self) -> &Value {
        match &self.value {
            Value::Array(items) => items.first().unwrap_or(&self.value),
            other => other,
        }
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl fmt::Display for ValueFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
