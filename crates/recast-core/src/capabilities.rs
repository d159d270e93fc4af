//! Process-wide capability probe
//!
//! The arithmetic built-ins can run on a `rust_decimal` backend or on
//! plain `f64`. Which one is available is decided once per process and then
//! handed to the registry explicitly; nothing reads the cached value after the
//! registry has been constructed.

use std::sync::OnceLock;

/// Environment variable that can switch the precise backend off at runtime
pub const PRECISE_ARITHMETIC_ENV: &str = "RECAST_PRECISE_ARITHMETIC";

static DETECTED: OnceLock<Capabilities> = OnceLock::new();

/// Optional backends available to the built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Decimal arithmetic (truncating to the requested scale)
    pub precise_arithmetic: bool,
}

impl Capabilities {
    /// Capabilities of this process, probed on first call and cached
    pub fn detect() -> Self {
        *DETECTED.get_or_init(Self::probe)
    }

    /// Probe without consulting the cache
    pub fn probe() -> Self {
        let compiled_in = cfg!(feature = "precise-arithmetic");
        let disabled = std::env::var(PRECISE_ARITHMETIC_ENV)
            .map(|value| is_disabling(&value))
            .unwrap_or(false);

        let capabilities = Self {
            precise_arithmetic: compiled_in && !disabled,
        };
        tracing::debug!(
            precise_arithmetic = capabilities.precise_arithmetic,
            "Probed arithmetic capabilities"
        );
        capabilities
    }

    /// Force the float backend
    pub fn float_only() -> Self {
        Self {
            precise_arithmetic: false,
        }
    }

    /// Force the decimal backend
    pub fn precise() -> Self {
        Self {
            precise_arithmetic: true,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}

fn is_disabling(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off"
    )
}
