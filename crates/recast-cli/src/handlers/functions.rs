//! Functions command handler

use super::utils::build_converter;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use recast_core::BAIL_IF_EMPTY;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct FunctionListing {
    functions: Vec<String>,
    directives: Vec<&'static str>,
    precise_arithmetic: bool,
}

/// Handle the functions command
#[instrument(skip_all)]
pub fn handle_functions(config: &Config, output: &mut OutputWriter) -> Result<()> {
    let precise_arithmetic = config.arithmetic.capabilities(false).precise_arithmetic;
    let converter = build_converter(config, false);
    let listing = FunctionListing {
        functions: converter.registry().names(),
        directives: vec![BAIL_IF_EMPTY],
        precise_arithmetic,
    };

    if !output.is_human() {
        return output.data(&listing);
    }

    output.section("Functions")?;
    for name in &listing.functions {
        output.writeln(&format!("  {}", name))?;
    }
    output.section("Directives")?;
    for name in &listing.directives {
        output.writeln(&format!("  {}", name))?;
    }
    output.info(&format!(
        "Arithmetic backend: {}",
        if listing.precise_arithmetic { "decimal" } else { "f64" }
    ))?;

    Ok(())
}
