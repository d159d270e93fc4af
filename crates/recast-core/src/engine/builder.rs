//! Builder for configuring a [`Converter`]
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use super::pipeline::Converter;
use crate::capabilities::Capabilities;
use crate::error::Result;
use crate::registry::{BuiltinRegistry, FunctionRegistry};
use crate::value::Value;
use std::sync::Arc;

type Registration = (String, Arc<dyn Fn(Value, &[String]) -> Result<Value> + Send + Sync>);

/// Builder for creating converters
#[derive(Default)]
pub struct ConverterBuilder {
    registry: Option<Arc<dyn FunctionRegistry>>,
    capabilities: Option<Capabilities>,
    functions: Vec<Registration>,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom registry instead of the built-ins.
    ///
    /// Capabilities and extra functions set on this builder only apply to
    /// the built-in registry and are ignored once a custom one is given.
    pub fn registry(mut self, registry: Arc<dyn FunctionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Capabilities for the built-in arithmetic, instead of the detected ones
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Force the float arithmetic backend
    pub fn float_arithmetic(self) -> Self {
        self.capabilities(Capabilities::float_only())
    }

    /// Add or replace a function in the built-in registry
    pub fn function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Value, &[String]) -> Result<Value> + Send + Sync + 'static,
    {
        self.functions.push((name.into(), Arc::new(function)));
        self
    }

    /// Build the converter
    pub fn build(self) -> Converter {
        if let Some(registry) = self.registry {
            if !self.functions.is_empty() {
                tracing::warn!(
                    ignored = self.functions.len(),
                    "Custom registry given, extra functions are ignored"
                );
            }
            return Converter::with_registry(registry);
        }

        let capabilities = self.capabilities.unwrap_or_else(Capabilities::detect);
        let mut registry = BuiltinRegistry::new(capabilities);
        for (name, function) in self.functions {
            registry.register(name, move |value, args| function(value, args));
        }
        Converter::with_registry(Arc::new(registry))
    }
}
