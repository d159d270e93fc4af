//! Check command handler
//!
//! Compiles every rule of a rule set without running it, lists the compiled
//! steps, and flags step names the registry does not know.

use super::utils::{build_converter, load_rules, resolve_rules_path};
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use recast_core::{FunctionRegistry, KeyPattern, RuleSet, Step};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Outcome of compiling one rule
#[derive(Debug, Serialize)]
pub(crate) struct RuleReport {
    pattern: String,
    steps: Vec<String>,
    /// Step names missing from the registry; they can only resolve on values
    /// that answer to them
    unresolved: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Compile every rule against `registry`
pub(crate) fn inspect(rules: &RuleSet, registry: &dyn FunctionRegistry) -> Vec<RuleReport> {
    rules
        .iter()
        .map(|rule| {
            let mut report = RuleReport {
                pattern: rule.pattern().to_string(),
                steps: Vec::new(),
                unresolved: Vec::new(),
                error: None,
            };

            if let Err(e) = KeyPattern::new(rule.pattern()) {
                report.error = Some(e.to_string());
                return report;
            }

            match rule.steps().compile() {
                Ok(steps) => {
                    for step in &steps {
                        report.steps.push(step.label());
                        if let Step::Named(call) = step {
                            if !step.is_bail() && !registry.contains(&call.name) {
                                report.unresolved.push(call.name.clone());
                            }
                        }
                    }
                }
                Err(e) => report.error = Some(e.to_string()),
            }
            report
        })
        .collect()
}

/// Handle the check command
#[instrument(skip(config, output), fields(rules = %args.rules.display()))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("check_command", &format!("rules: {}", args.rules.display()));
    let _entered = timer.span().enter();
    info!("Starting rule check");

    let rules_path = resolve_rules_path(&args.rules, config)?;
    let rules = load_rules(&rules_path)?;
    let converter = build_converter(config, false);
    let reports = inspect(&rules, &**converter.registry());
    debug!(rules = reports.len(), "Compiled rule set");

    output.info(&format!("Checking {} rule(s) from {}", reports.len(), rules_path.display()))?;
    output.table(
        &["Pattern", "Steps"],
        reports
            .iter()
            .map(|report| {
                let steps = match &report.error {
                    Some(_) => "(invalid)".to_string(),
                    None => report.steps.join("|"),
                };
                vec![report.pattern.clone(), steps]
            })
            .collect(),
    )?;

    let mut failures = 0;
    for report in &reports {
        for name in &report.unresolved {
            warn!(pattern = %report.pattern, step = %name, "Step is not a registered function");
            output.warning(&format!(
                "⚠ '{}' in rule '{}' is not a registered function; it only resolves on values that answer to it",
                name, report.pattern
            ))?;
        }
        if let Some(message) = &report.error {
            failures += 1;
            output.error(&format!("✗ Rule '{}': {}", report.pattern, message))?;
        }
    }

    if !output.is_human() {
        output.data(&reports)?;
    }

    if failures > 0 {
        return Err(Error::other(format!("{} rule(s) failed to compile", failures)));
    }

    output.success("✓ Rule set compiles")?;
    Ok(())
}
