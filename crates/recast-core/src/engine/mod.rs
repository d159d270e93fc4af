//! Rule-driven conversion engine
//!
//! A [`RuleSet`] maps key patterns to pipelines of steps. The [`Converter`]
//! matches patterns against the top-level keys of a record and runs each
//! pipeline over the matched values.
//!
//! # Module Organization
//!
//! - [`path`] - dotted-path get/set over value trees
//! - [`matcher`] - wildcard key matching
//! - [`types`] - rules, step descriptions and compiled steps
//! - [`parser`] - step descriptor and CSV argument parsing
//! - [`pipeline`] - the converter
//! - [`builder`] - converter configuration
//!
//! # Examples
//!
//! ```
//! use recast_core::{Converter, Record, RuleSet, Value};
//! use serde_json::json;
//!
//! let record = Record::from_json(json!({
//!     "name": "   Ada  ",
//!     "phone_home": "(123) 456 7890",
//! })).unwrap();
//!
//! let rules = RuleSet::new()
//!     .rule("name", "trim|toUpper")
//!     .rule("phone_*", "onlyNumbers|phone");
//!
//! let converted = Converter::new().apply(&record, &rules).unwrap();
//! assert_eq!(converted["name"], Value::from("ADA"));
//! assert_eq!(converted["phone_home"], Value::from("(123)456-7890"));
//! ```
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod matcher;
pub mod parser;
pub mod path;
pub mod pipeline;
pub mod types;

#[cfg(test)]
mod tests;

pub use builder::ConverterBuilder;
pub use matcher::{is_match, KeyPattern};
pub use parser::{parse_csv_args, parse_descriptor, split_pipeline};
pub use pipeline::Converter;
pub use types::{
    callback, Callback, Formattable, FormatterRef, NamedCall, Rule, RuleSet, Step, StepItem, StepSpec,
    BAIL_IF_EMPTY,
};
