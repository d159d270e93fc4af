//! Wildcard key matching
//!
//! Rule keys are glob-like: `*` matches any run of characters, including
//! none, and every other character matches itself. Matching is anchored at
//! both ends and Unicode-aware.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use regex::Regex;

/// Whether `candidate` satisfies any of `patterns`.
///
/// An empty pattern set matches nothing. A pattern equal to the candidate
/// matches before any wildcard handling takes place.
pub fn is_match<I, S>(patterns: I, candidate: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns.into_iter().any(|pattern| {
        let pattern = pattern.as_ref();
        if pattern == candidate {
            return true;
        }
        match compile(pattern) {
            Ok(regex) => regex.is_match(candidate),
            Err(err) => {
                tracing::warn!(pattern, error = %err, "Skipping key pattern that failed to compile");
                false
            }
        }
    })
}

/// A key pattern compiled once and matched many times
#[derive(Debug, Clone)]
pub struct KeyPattern {
    source: String,
    regex: Option<Regex>,
}

impl KeyPattern {
    /// Compile a rule key
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let source = pattern.into();
        let regex = if source.contains('*') {
            Some(compile(&source)?)
        } else {
            None
        };
        Ok(Self { source, regex })
    }

    /// The rule key as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_wildcard(&self) -> bool {
        self.regex.is_some()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        if self.source == candidate {
            return true;
        }
        self.regex.as_ref().is_some_and(|regex| regex.is_match(candidate))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    let body = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!(r"(?s)\A{}\z", body)).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
