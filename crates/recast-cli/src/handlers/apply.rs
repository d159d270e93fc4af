//! Apply command handler

use super::utils::{build_converter, load_rules, read_document, render_document, resolve_rules_path};
use crate::cli::ApplyArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use recast_core::Record;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// Records read from an input document
#[derive(Debug)]
pub(crate) struct Batch {
    records: Vec<Record>,
    /// Whether the input was a list (output mirrors the input shape)
    list: bool,
}

impl Batch {
    pub(crate) fn from_document(path: &Path, document: serde_json::Value) -> Result<Self> {
        let invalid = || Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "an object or an array of objects".to_string(),
        };

        match document {
            serde_json::Value::Object(_) => Ok(Self {
                records: vec![Record::from_json(document).map_err(|_| invalid())?],
                list: false,
            }),
            serde_json::Value::Array(items) => {
                let records = items
                    .into_iter()
                    .map(|item| Record::from_json(item).map_err(|_| invalid()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self { records, list: true })
            }
            _ => Err(invalid()),
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        if self.list {
            serde_json::Value::Array(self.records.iter().map(Record::to_json).collect())
        } else {
            self.records
                .first()
                .map(Record::to_json)
                .unwrap_or(serde_json::Value::Null)
        }
    }
}

/// Handle the apply command
#[instrument(skip(config, output), fields(input = %args.input.display(), rules = %args.rules.display()))]
pub fn handle_apply(args: ApplyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("apply_command", &format!("input: {}", args.input.display()));
    let _entered = timer.span().enter();
    info!("Starting apply command");

    let rules_path = resolve_rules_path(&args.rules, config)?;
    if let Some(save_to) = &args.save_to {
        if save_to == &args.input || save_to == &rules_path {
            return Err(Error::invalid_args(format!(
                "--save-to would overwrite {}",
                save_to.display()
            )));
        }
    }

    let rules = load_rules(&rules_path)?;
    let batch = Batch::from_document(&args.input, read_document(&args.input)?)?;
    let converter = build_converter(config, args.float_arithmetic);
    debug!(records = batch.records.len(), rules = rules.len(), "Converting records");

    let converted = {
        let _conversion_timer = Timer::new("conversion");
        let mut converted = Vec::with_capacity(batch.records.len());
        for (index, record) in batch.records.iter().enumerate() {
            match converter.apply(record, &rules) {
                Ok(record) => converted.push(record),
                Err(e) => {
                    error!(record = index, error = %e, "Conversion failed");
                    return Err(e.into());
                }
            }
        }
        Batch {
            records: converted,
            list: batch.list,
        }
    };

    let result = converted.to_json();
    let mut logged = result.clone();
    redaction::redact_json_value(&mut logged);
    debug!(payload = %logged, "Converted payload");

    output.success(&format!(
        "✓ Converted {} record(s) with {} rule(s) in {}ms",
        converted.records.len(),
        rules.len(),
        timer.elapsed().as_millis()
    ))?;
    output.data(&result)?;

    if let Some(save_to) = &args.save_to {
        fs::write(save_to, render_document(save_to, &result)?)?;
        info!(path = %save_to.display(), "Saved converted records");
        output.success(&format!("✓ Output saved to {}", save_to.display()))?;
    }

    Ok(())
}
