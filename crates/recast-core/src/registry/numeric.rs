//! Numeric built-ins: fixed decimals and arithmetic with a result scale
//!
//! Arithmetic runs on the decimal backend when the registry was built with
//! precise arithmetic, truncating results to the scale. Otherwise (or when an
//! operand does not fit a decimal) it runs on `f64` and rounds half away from
//! zero. Results are decimal strings. A leaf or operand
//! that is not numeric passes through unchanged.

use super::{int_arg, required_arg, BuiltinRegistry};
use crate::capabilities::Capabilities;
use crate::error::{Error, Result};
use crate::value::Value;
use regex::Regex;
use std::sync::OnceLock;

/// Largest result scale a step may ask for
pub const MAX_RESULT_SCALE: u32 = 1000;

static NUMERIC: OnceLock<Option<Regex>> = OnceLock::new();

/// Whether text is numeric: optional sign, digits with an optional
/// fraction, an optional exponent, surrounding whitespace allowed
pub fn is_numeric(text: &str) -> bool {
    NUMERIC
        .get_or_init(|| Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(text))
}

/// Numeric text of a leaf, if it has one
fn numeric_text(value: &Value) -> Option<String> {
    match value {
        Value::Int(_) | Value::Float(_) | Value::String(_) => {
            value.text().filter(|text| is_numeric(text)).map(|text| text.into_owned())
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operation {
    fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
        }
    }
}

/// Register the numeric built-ins
pub(crate) fn register(registry: &mut BuiltinRegistry, capabilities: Capabilities) {
    let precise = capabilities.precise_arithmetic;

    registry.register("decimals", decimals);
    registry.register("decimalPercent", move |value, args| decimal_percent(value, args, precise));

    for operation in [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
    ] {
        registry.register(operation.name(), move |value, args| {
            arithmetic(operation, value, args, precise)
        });
    }
}

fn scale_arg(function: &str, args: &[String], index: usize, default: i64) -> Result<u32> {
    let scale = int_arg(function, args, index, "scale", default)?;
    let raw = args.get(index).map(String::as_str);
    let scale = u32::try_from(scale)
        .map_err(|_| Error::invalid_argument(function, raw, "scale must not be negative"))?;
    if scale > MAX_RESULT_SCALE {
        return Err(Error::invalid_argument(
            function,
            raw,
            format!("scale must be at most {}", MAX_RESULT_SCALE),
        ));
    }
    Ok(scale)
}

/// `decimals(places=2)`: fixed notation with the given number of places
pub fn decimals(value: Value, args: &[String]) -> Result<Value> {
    let places = scale_arg("decimals", args, 0, 2)?;
    let Some(text) = numeric_text(&value) else {
        return Ok(value);
    };
    match text.trim().parse::<f64>() {
        Ok(number) => Ok(Value::String(format_fixed(number, places))),
        Err(_) => Ok(value),
    }
}

fn decimal_percent(value: Value, args: &[String], precise: bool) -> Result<Value> {
    let scale = scale_arg("decimalPercent", args, 0, 2)?;
    if numeric_text(&value).is_none() {
        return Ok(value);
    }
    compute(Operation::Divide, value, "100", scale, precise)
}

fn arithmetic(operation: Operation, value: Value, args: &[String], precise: bool) -> Result<Value> {
    let function = operation.name();
    let operand = required_arg(function, args, 0, "number")?;
    let scale = scale_arg(function, args, 1, 0)?;
    compute(operation, value, operand, scale, precise)
}

fn compute(operation: Operation, value: Value, operand: &str, scale: u32, precise: bool) -> Result<Value> {
    let Some(left) = numeric_text(&value) else {
        return Ok(value);
    };
    if !is_numeric(operand) {
        return Ok(value);
    }

    if precise {
        if let Some(result) = compute_precise(operation, &left, operand, scale) {
            return Ok(Value::String(result));
        }
    }

    let (Ok(a), Ok(b)) = (left.trim().parse::<f64>(), operand.trim().parse::<f64>()) else {
        return Ok(value);
    };
    if operation == Operation::Divide && b == 0.0 {
        tracing::warn!(value = %left, "Division by zero, leaving value unchanged");
        return Ok(value);
    }

    let result = match operation {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => a / b,
        Operation::Power => a.powf(b),
    };
    if !result.is_finite() {
        tracing::warn!(operation = operation.name(), value = %left, operand, "Arithmetic result is not finite, leaving value unchanged");
        return Ok(value);
    }
    Ok(Value::String(format_fixed(result, scale)))
}

/// Decimal evaluation; `None` defers to the float backend
#[cfg(feature = "precise-arithmetic")]
fn compute_precise(operation: Operation, left: &str, right: &str, scale: u32) -> Option<String> {
    super::decimal::evaluate(operation, left, right, scale)
}

#[cfg(not(feature = "precise-arithmetic"))]
fn compute_precise(_operation: Operation, _left: &str, _right: &str, _scale: u32) -> Option<String> {
    None
}

/// Round half away from zero to `places` decimals
pub(crate) fn format_fixed(number: f64, places: u32) -> String {
    let factor = 10f64.powi(places.min(308) as i32);
    let mut rounded = (number * factor).round() / factor;
    if !rounded.is_finite() {
        rounded = number;
    }
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{:.*}", places as usize, rounded)
}
