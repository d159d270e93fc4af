//! Rule execution
//!
//! For every rule, in declaration order, the converter selects the top-level
//! keys of the current record that match the rule's pattern, runs the rule's
//! steps over each matched value and merges the results back (last write
//! wins). Steps work leaf-wise: once a step meets an array or a nested
//! record, the rest of the pipeline runs separately for every element,
//! recursively, and the container shape (keys and order included) is kept.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use super::matcher::KeyPattern;
use super::path;
use super::types::{Rule, RuleSet, Step};
use crate::capabilities::Capabilities;
use crate::error::{Error, Result};
use crate::registry::{BuiltinRegistry, FunctionRegistry};
use crate::value::{Record, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Applies rule sets to records
#[derive(Clone)]
pub struct Converter {
    registry: Arc<dyn FunctionRegistry>,
}

impl Converter {
    /// Converter backed by the built-in functions and detected capabilities
    pub fn new() -> Self {
        Self::with_registry(Arc::new(BuiltinRegistry::new(Capabilities::detect())))
    }

    pub fn with_registry(registry: Arc<dyn FunctionRegistry>) -> Self {
        Self { registry }
    }

    pub fn builder() -> super::builder::ConverterBuilder {
        super::builder::ConverterBuilder::new()
    }

    pub fn registry(&self) -> &Arc<dyn FunctionRegistry> {
        &self.registry
    }

    /// Apply `rules` to a copy of `record`.
    ///
    /// The caller's record is never touched, so a failing conversion leaves
    /// it intact.
    pub fn apply(&self, record: &Record, rules: &RuleSet) -> Result<Record> {
        let mut converted = record.clone();
        self.apply_in_place(&mut converted, rules)?;
        Ok(converted)
    }

    /// Apply `rules` to `record` directly.
    ///
    /// Not atomic: when a rule fails, the rules before it stay applied.
    pub fn apply_in_place(&self, record: &mut Record, rules: &RuleSet) -> Result<()> {
        for rule in rules {
            self.apply_rule(record, rule)?;
        }
        Ok(())
    }

    fn apply_rule(&self, record: &mut Record, rule: &Rule) -> Result<()> {
        let steps = rule.steps().compile()?;
        let pattern = KeyPattern::new(rule.pattern())?;

        let mut matched = Value::Map(record.select(|key| pattern.matches(key)));
        let keys: Vec<String> = matched
            .as_map()
            .map(|map| map.keys().map(str::to_string).collect())
            .unwrap_or_default();

        debug!(
            pattern = rule.pattern(),
            matched = keys.len(),
            steps = steps.len(),
            "Applying conversion rule"
        );

        for key in &keys {
            let current = path::get(&matched, Some(key), Value::Null);
            let converted = self.run(current, &steps, key)?;
            path::set(&mut matched, Some(key), converted);
        }

        if let Value::Map(converted) = matched {
            record.merge(converted);
        }
        Ok(())
    }

    /// Run `steps` over a value, distributing over array elements and
    /// nested record values
    fn run(&self, mut value: Value, steps: &[Step], key: &str) -> Result<Value> {
        for (index, step) in steps.iter().enumerate() {
            let remaining = &steps[index..];
            match value {
                Value::Array(items) => {
                    return items
                        .into_iter()
                        .map(|item| self.run(item, remaining, key))
                        .collect::<Result<Vec<_>>>()
                        .map(Value::Array);
                }
                Value::Map(record) => {
                    return record
                        .into_iter()
                        .map(|(field, item)| Ok((field, self.run(item, remaining, key)?)))
                        .collect::<Result<Record>>()
                        .map(Value::Map);
                }
                _ => {}
            }

            if step.is_bail() {
                if value.is_blank() {
                    debug!(key, "Value is empty, skipping remaining steps");
                    break;
                }
                continue;
            }

            trace!(key, step = %step.label(), "Running step");
            value = self.dispatch(step, value)?;
        }
        Ok(value)
    }

    fn dispatch(&self, step: &Step, value: Value) -> Result<Value> {
        match step {
            Step::Callback(callback) => callback.call(value),
            Step::Formatter(formatter) => Ok(formatter.format(value)),
            Step::Named(call) => self.call_leaf(&call.name, value, &call.args),
        }
    }

    /// Resolve a named step for one leaf: registry first, then the leaf's
    /// own capability
    fn call_leaf(&self, name: &str, value: Value, args: &[String]) -> Result<Value> {
        if let Some(function) = self.registry.lookup(name) {
            return function(value, args).map(Value::normalize_blank);
        }

        if let Value::Object(object) = &value {
            if object.responds_to(name) {
                debug!(step = name, kind = object.kind(), "Delegating step to value");
                return object.invoke(name, args).map(Value::normalize_blank);
            }
        }

        Err(Error::UnknownStep {
            name: name.to_string(),
            value_kind: value.kind().to_string(),
        })
    }

    /// Apply one named step outside any rule set, leaf-wise
    pub fn call(&self, name: &str, value: Value, args: &[String]) -> Result<Value> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.call(name, item, args))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Map(record) => record
                .into_iter()
                .map(|(field, item)| Ok((field, self.call(name, item, args)?)))
                .collect::<Result<Record>>()
                .map(Value::Map),
            leaf => self.call_leaf(name, leaf, args),
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("functions", &self.registry.names().len())
            .finish()
    }
}
