//! Core types for rule-driven conversion
//!
//! This module defines rule sets, step descriptions as written by callers,
//! and the compiled steps the executor runs.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::value::Value;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::sync::Arc;

/// Control directive that stops the remaining steps for an empty leaf
pub const BAIL_IF_EMPTY: &str = "bailIfEmpty";

/// Capability of an object to format a single value
pub trait Formattable: Send + Sync {
    fn format(&self, value: Value) -> Value;
}

type CallbackFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// Caller-supplied unary function used as a step
#[derive(Clone)]
pub struct Callback {
    function: Arc<CallbackFn>,
}

impl Callback {
    /// Wrap an infallible closure
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(move |value| Ok(function(value))),
        }
    }

    /// Wrap a closure that may fail; its error aborts the conversion
    pub fn fallible<F>(function: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(move |value| {
                function(value).map_err(|source| Error::Callback {
                    message: source.to_string(),
                    source,
                })
            }),
        }
    }

    pub fn call(&self, value: Value) -> Result<Value> {
        (self.function)(value)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Shorthand for [`Callback::new`]
pub fn callback<F>(function: F) -> Callback
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Callback::new(function)
}

/// Reference to a formatter, either a shared instance or a type that is
/// instantiated for every invocation
#[derive(Clone)]
pub enum FormatterRef {
    Instance(Arc<dyn Formattable>),
    Type {
        name: &'static str,
        make: fn() -> Box<dyn Formattable>,
    },
}

impl FormatterRef {
    pub fn instance(formatter: impl Formattable + 'static) -> Self {
        FormatterRef::Instance(Arc::new(formatter))
    }

    /// Refer to a formatter by type; a fresh default instance formats each leaf
    pub fn of_type<T>() -> Self
    where
        T: Formattable + Default + 'static,
    {
        FormatterRef::Type {
            name: std::any::type_name::<T>(),
            make: make_formatter::<T>,
        }
    }

    pub fn format(&self, value: Value) -> Value {
        match self {
            FormatterRef::Instance(formatter) => formatter.format(value),
            FormatterRef::Type { make, .. } => make().format(value),
        }
    }
}

fn make_formatter<T>() -> Box<dyn Formattable>
where
    T: Formattable + Default + 'static,
{
    Box::new(T::default())
}

impl fmt::Debug for FormatterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatterRef::Instance(_) => f.write_str("FormatterRef::Instance(..)"),
            FormatterRef::Type { name, .. } => write!(f, "FormatterRef::Type({})", name),
        }
    }
}

/// A named function call with its string arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCall {
    pub name: String,
    pub args: Vec<String>,
}

impl NamedCall {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// One compiled step of a rule's pipeline
#[derive(Debug, Clone)]
pub enum Step {
    Named(NamedCall),
    Callback(Callback),
    Formatter(FormatterRef),
}

impl Step {
    /// Whether this is the `bailIfEmpty` directive
    pub fn is_bail(&self) -> bool {
        matches!(self, Step::Named(call) if call.name == BAIL_IF_EMPTY)
    }

    /// Short label for diagnostics
    pub fn label(&self) -> String {
        match self {
            Step::Named(call) if call.args.is_empty() => call.name.clone(),
            Step::Named(call) => format!("{}:{}", call.name, call.args.join(",")),
            Step::Callback(_) => "<callback>".to_string(),
            Step::Formatter(FormatterRef::Instance(_)) => "<formatter>".to_string(),
            Step::Formatter(FormatterRef::Type { name, .. }) => format!("<formatter {}>", name),
        }
    }
}

/// One element of a step list
#[derive(Debug, Clone)]
pub enum StepItem {
    /// `name` or `name:csv,args`
    Descriptor(String),
    Callback(Callback),
    Formatter(FormatterRef),
}

impl From<&str> for StepItem {
    fn from(value: &str) -> Self {
        StepItem::Descriptor(value.to_string())
    }
}

impl From<String> for StepItem {
    fn from(value: String) -> Self {
        StepItem::Descriptor(value)
    }
}

impl From<Callback> for StepItem {
    fn from(value: Callback) -> Self {
        StepItem::Callback(value)
    }
}

impl From<FormatterRef> for StepItem {
    fn from(value: FormatterRef) -> Self {
        StepItem::Formatter(value)
    }
}

/// A rule's step description as written by the caller
#[derive(Debug, Clone)]
pub enum StepSpec {
    /// Pipe-delimited descriptors, e.g. `"trim|suffix:yay"`
    Piped(String),
    /// Already separated steps; descriptors here are not split on `|`
    Items(Vec<StepItem>),
}

impl From<&str> for StepSpec {
    fn from(value: &str) -> Self {
        StepSpec::Piped(value.to_string())
    }
}

impl From<String> for StepSpec {
    fn from(value: String) -> Self {
        StepSpec::Piped(value)
    }
}

impl From<Vec<StepItem>> for StepSpec {
    fn from(value: Vec<StepItem>) -> Self {
        StepSpec::Items(value)
    }
}

impl From<Vec<&str>> for StepSpec {
    fn from(value: Vec<&str>) -> Self {
        StepSpec::Items(value.into_iter().map(StepItem::from).collect())
    }
}

impl From<Callback> for StepSpec {
    fn from(value: Callback) -> Self {
        StepSpec::Items(vec![StepItem::Callback(value)])
    }
}

impl From<FormatterRef> for StepSpec {
    fn from(value: FormatterRef) -> Self {
        StepSpec::Items(vec![StepItem::Formatter(value)])
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawStepSpec {
    Piped(String),
    Items(Vec<String>),
}

impl<'de> Deserialize<'de> for StepSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawStepSpec::deserialize(deserializer)? {
            RawStepSpec::Piped(text) => StepSpec::Piped(text),
            RawStepSpec::Items(items) => StepSpec::Items(items.into_iter().map(StepItem::Descriptor).collect()),
        })
    }
}

/// A key pattern and the steps run on every key it matches
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    steps: StepSpec,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, steps: impl Into<StepSpec>) -> Self {
        Self {
            pattern: pattern.into(),
            steps: steps.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn steps(&self) -> &StepSpec {
        &self.steps
    }
}

/// Ordered mapping from key pattern to step description.
///
/// Rules run in insertion order. Declaring a pattern again replaces its
/// steps without moving the rule.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, builder style
    pub fn rule(mut self, pattern: impl Into<String>, steps: impl Into<StepSpec>) -> Self {
        self.insert(pattern, steps);
        self
    }

    /// Add a rule, replacing the steps of an existing rule with the same pattern
    pub fn insert(&mut self, pattern: impl Into<String>, steps: impl Into<StepSpec>) {
        let rule = Rule::new(pattern, steps);
        match self.rules.iter_mut().find(|existing| existing.pattern == rule.pattern) {
            Some(existing) => existing.steps = rule.steps,
            None => self.rules.push(rule),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::pattern)
    }
}

impl<K, S> FromIterator<(K, S)> for RuleSet
where
    K: Into<String>,
    S: Into<StepSpec>,
{
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        for (pattern, steps) in iter {
            rules.insert(pattern, steps);
        }
        rules
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

struct RuleSetVisitor;

impl<'de> Visitor<'de> for RuleSetVisitor {
    type Value = RuleSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of key patterns to step descriptions")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<RuleSet, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut rules = RuleSet::new();
        while let Some((pattern, steps)) = access.next_entry::<String, StepSpec>()? {
            rules.insert(pattern, steps);
        }
        Ok(rules)
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RuleSetVisitor)
    }
}
