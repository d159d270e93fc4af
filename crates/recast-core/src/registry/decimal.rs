//! Decimal evaluation for the precise arithmetic backend
//!
//! Operands are parsed into [`rust_decimal::Decimal`] and results are
//! truncated toward zero to the requested scale, then rendered with exactly
//! that many decimals. `None` means an operand or the result does not fit a
//! `Decimal`, in which case the caller falls back to float arithmetic.

use super::numeric::Operation;
use rust_decimal::prelude::{MathematicalOps, ToPrimitive};
use rust_decimal::Decimal;

/// Most decimals a `Decimal` can carry
pub(crate) const MAX_SCALE: u32 = 28;

/// Evaluate `left <operation> right` truncated to `scale` decimals
pub(crate) fn evaluate(operation: Operation, left: &str, right: &str, scale: u32) -> Option<String> {
    if scale > MAX_SCALE {
        return None;
    }
    let a = parse(left)?;
    let b = parse(right)?;

    let result = match operation {
        Operation::Add => a.checked_add(b)?,
        Operation::Subtract => a.checked_sub(b)?,
        Operation::Multiply => a.checked_mul(b)?,
        Operation::Divide => {
            if b.is_zero() {
                // handled by the float path, which logs and passes through
                return None;
            }
            a.checked_div(b)?
        }
        Operation::Power => power(a, b)?,
    };
    Some(render(result, scale))
}

fn parse(text: &str) -> Option<Decimal> {
    text.trim().parse::<Decimal>().ok()
}

/// Integer powers only; fractional exponents go to the float backend
fn power(base: Decimal, exponent: Decimal) -> Option<Decimal> {
    if !exponent.fract().is_zero() {
        return None;
    }
    let exponent = exponent.to_i64()?;
    let magnitude = base.checked_powi(exponent.checked_abs()?)?;
    if exponent < 0 {
        Decimal::ONE.checked_div(magnitude)
    } else {
        Some(magnitude)
    }
}

fn render(value: Decimal, scale: u32) -> String {
    let mut truncated = value.trunc_with_scale(scale);
    truncated.rescale(scale);
    if truncated.is_zero() {
        truncated.set_sign_positive(true);
    }
    truncated.to_string()
}
