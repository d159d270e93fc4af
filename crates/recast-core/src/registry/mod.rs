//! Named conversion functions
//!
//! The executor resolves every named step through a [`FunctionRegistry`].
//! [`BuiltinRegistry`] is a plain name → function table populated at
//! construction; callers can add or replace entries with
//! [`BuiltinRegistry::register`].
//!
//! Every built-in is defensive: a leaf of a kind the function does not handle
//! is returned unchanged. Only malformed step arguments are errors.
//!
//! # Module Organization
//!
//! - [`text`] - trimming, casing, character filters, phone and chunk formatting
//! - [`numeric`] - fixed decimals and scaled arithmetic
//! - [`date`] - the `toDate` parser and the [`date::DateValue`] delegate

pub mod date;
#[cfg(feature = "precise-arithmetic")]
mod decimal;
pub mod numeric;
pub mod text;

use crate::capabilities::Capabilities;
use crate::error::{Error, Result};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered conversion function: `(leaf, args) -> leaf`
pub type TransformFn = Arc<dyn Fn(Value, &[String]) -> Result<Value> + Send + Sync>;

/// Lookup of named conversion functions
pub trait FunctionRegistry: Send + Sync {
    /// Resolve a step name; `None` is an expected outcome
    fn lookup(&self, name: &str) -> Option<TransformFn>;

    /// Every registered name, sorted
    fn names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// Table of the built-in functions plus any caller registrations
#[derive(Clone)]
pub struct BuiltinRegistry {
    functions: HashMap<String, TransformFn>,
    capabilities: Capabilities,
}

impl BuiltinRegistry {
    /// Registry with every built-in, arithmetic bound to `capabilities`
    pub fn new(capabilities: Capabilities) -> Self {
        let mut registry = Self::empty(capabilities);
        text::register(&mut registry);
        numeric::register(&mut registry, capabilities);
        date::register(&mut registry);
        registry
    }

    /// Registry without any functions
    pub fn empty(capabilities: Capabilities) -> Self {
        Self {
            functions: HashMap::new(),
            capabilities,
        }
    }

    /// Add a function, replacing any earlier one with the same name
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(Value, &[String]) -> Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Value, &[String]) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<TransformFn> {
        self.functions.get(name).cloned()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new(Capabilities::detect())
    }
}

impl FunctionRegistry for BuiltinRegistry {
    fn lookup(&self, name: &str) -> Option<TransformFn> {
        self.get(name)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("functions", &self.names())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Required positional argument
pub(crate) fn required_arg<'a>(function: &str, args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| Error::invalid_argument(function, None, format!("missing required argument '{}'", name)))
}

/// Optional positional argument with a default
pub(crate) fn optional_arg<'a>(args: &'a [String], index: usize, default: &'a str) -> &'a str {
    args.get(index).map(String::as_str).unwrap_or(default)
}

/// Optional integer argument with a default
pub(crate) fn int_arg(function: &str, args: &[String], index: usize, name: &str, default: i64) -> Result<i64> {
    match args.get(index) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            Error::invalid_argument(
                function,
                Some(raw),
                format!("argument '{}' must be an integer, got '{}'", name, raw),
            )
        }),
    }
}

/// Optional boolean argument, read with the `toBoolean` rules
pub(crate) fn bool_arg(args: &[String], index: usize, default: bool) -> bool {
    args.get(index).map_or(default, |raw| text::truthy(raw))
}
