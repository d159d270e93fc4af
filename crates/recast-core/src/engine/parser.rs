//! Step descriptor parsing
//!
//! A pipe string such as `"trim|add:2,2"` compiles into one step per piece.
//! Each descriptor splits at its first `:` into a function name and a single
//! CSV record of string arguments.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use super::types::{NamedCall, Step, StepItem, StepSpec};
use crate::error::{Error, Result};

impl StepSpec {
    /// Compile into the ordered steps the executor runs
    pub fn compile(&self) -> Result<Vec<Step>> {
        match self {
            StepSpec::Piped(text) => split_pipeline(text).into_iter().map(parse_descriptor).collect(),
            StepSpec::Items(items) => items
                .iter()
                .map(|item| match item {
                    StepItem::Descriptor(descriptor) => parse_descriptor(descriptor),
                    StepItem::Callback(callback) => Ok(Step::Callback(callback.clone())),
                    StepItem::Formatter(formatter) => Ok(Step::Formatter(formatter.clone())),
                })
                .collect(),
        }
    }
}

/// Split a pipe string into descriptors.
///
/// Leading and trailing pipes are ignored; a blank string has no steps.
pub fn split_pipeline(text: &str) -> Vec<&str> {
    let trimmed = text.trim_matches('|');
    if trimmed.trim().is_empty() {
        return Vec::new();
    }
    trimmed.split('|').collect()
}

/// Parse one `name` or `name:csv,args` descriptor
pub fn parse_descriptor(descriptor: &str) -> Result<Step> {
    let (name, args) = match descriptor.split_once(':') {
        Some((name, raw_args)) => (name.trim(), parse_csv_args(raw_args)?),
        None => (descriptor.trim(), Vec::new()),
    };

    if name.is_empty() {
        return Err(Error::invalid_step(descriptor, "missing step name"));
    }

    Ok(Step::Named(NamedCall::new(name, args)))
}

/// Parse a single CSV record into its fields.
///
/// Fields are separated by `,` and may be wrapped in `"`; inside quotes a
/// doubled `""` is a literal quote and `,` is ordinary text.
/// Whitespace before an opening quote is skipped, text after a closing quote
/// is appended to the field. The empty string is one empty field. An
/// unterminated quote is an error.
pub fn parse_csv_args(input: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut rest = input;

    loop {
        let leading = rest.trim_start_matches(|c: char| c != ',' && c.is_whitespace());
        let (field, remainder) = match leading.strip_prefix('"') {
            Some(quoted) => read_quoted(quoted, input)?,
            None => match rest.find(',') {
                Some(i) => (rest[..i].to_string(), Some(&rest[i + 1..])),
                None => (rest.to_string(), None),
            },
        };
        fields.push(field);

        match remainder {
            Some(next) => rest = next,
            None => break,
        }
    }

    Ok(fields)
}

fn read_quoted<'a>(body: &'a str, input: &str) -> Result<(String, Option<&'a str>)> {
    let mut field = String::new();
    let mut pos = 0;

    loop {
        let Some(offset) = body[pos..].find('"') else {
            return Err(Error::invalid_step(input, "unterminated quoted argument"));
        };
        field.push_str(&body[pos..pos + offset]);
        pos += offset + 1;

        if body[pos..].starts_with('"') {
            field.push('"');
            pos += 1;
        } else {
            break;
        }
    }

    let tail = &body[pos..];
    match tail.find(',') {
        Some(i) => {
            field.push_str(&tail[..i]);
            Ok((field, Some(&tail[i + 1..])))
        }
        None => {
            field.push_str(tail);
            Ok((field, None))
        }
    }
}
