//! Recast Core - rule-driven conversion of record payloads
//!
//! This crate normalizes request-like records with declarative rules: each
//! rule maps a wildcard key pattern to a pipeline of named functions,
//! callbacks or formatter objects, which run over every matched value.
//!
//! # Main Components
//!
//! - **Value Model**: [`Record`] and [`Value`], an ordered tree of values
//! - **Engine**: key matching, dotted paths, step parsing and the [`Converter`]
//! - **Registry**: the built-in named functions ([`BuiltinRegistry`])
//! - **Formatter**: fluent conversion of a single value ([`ValueFormatter`])
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//!
//! # Example
//!
//! ```
//! use recast_core::{apply, Record, RuleSet, Value};
//! use serde_json::json;
//!
//! let record = Record::from_json(json!({
//!     "total": "4",
//!     "note": "   hello  ",
//! }))?;
//! let rules = RuleSet::new()
//!     .rule("total", "add:2")
//!     .rule("note", "trim|suffix:!");
//!
//! let converted = apply(&record, &rules)?;
//! assert_eq!(converted["total"], Value::from("6"));
//! assert_eq!(converted["note"], Value::from("hello!"));
//! # Ok::<(), recast_core::Error>(())
//! ```

pub mod capabilities;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod registry;
pub mod value;

// Re-export main types for convenience
pub use capabilities::Capabilities;
pub use engine::{
    callback, is_match, parse_csv_args, parse_descriptor, path, Callback, Converter, ConverterBuilder,
    Formattable, FormatterRef, KeyPattern, NamedCall, Rule, RuleSet, Step, StepItem, StepSpec,
    BAIL_IF_EMPTY,
};
pub use error::{Error, Result};
pub use formatter::ValueFormatter;
pub use registry::date::DateValue;
pub use registry::{BuiltinRegistry, FunctionRegistry, TransformFn};
pub use value::{Record, Transformable, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Apply `rules` to a copy of `record` with a default [`Converter`]
pub fn apply(record: &Record, rules: &RuleSet) -> Result<Record> {
    Converter::new().apply(record, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_empty_rule_set_is_identity() {
        let record = Record::from_json(json!({"a": " x ", "b": [1, 2]})).unwrap();
        assert_eq!(apply(&record, &RuleSet::new()).unwrap(), record);
    }
}
