//! Error types for the Recast core library
//!
//! This module defines the error handling system for Recast, using thiserror
//! for ergonomic error definitions and anyhow for errors raised by
//! caller-supplied callbacks.

use thiserror::Error;

/// Main error type for Recast operations
#[derive(Error, Debug)]
pub enum Error {
    /// A named step that neither the registry nor the current value can answer
    #[error("Call to undefined conversion step [{name}] on {value_kind} value")]
    UnknownStep {
        name: String,
        value_kind: String,
    },

    /// A step descriptor that cannot be parsed
    #[error("Invalid step descriptor '{descriptor}': {message}")]
    InvalidStep {
        descriptor: String,
        message: String,
    },

    /// A step was invoked with arguments it cannot use
    #[error("Invalid argument for '{function}': {message}")]
    InvalidArgument {
        function: String,
        argument: Option<String>,
        message: String,
    },

    /// A key pattern that could not be compiled
    #[error("Invalid key pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A fallible callback step reported an error
    #[error("Callback step failed: {message}")]
    Callback {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// A value could not be used as a record
    #[error("Record error: {message}")]
    Record {
        message: String,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid argument error for a built-in function
    pub fn invalid_argument(function: &str, argument: Option<&str>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            function: function.to_string(),
            argument: argument.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create an invalid step error for a descriptor
    pub fn invalid_step(descriptor: &str, message: impl Into<String>) -> Self {
        Self::InvalidStep {
            descriptor: descriptor.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error stems from a broken rule set rather than from data.
    ///
    /// Configuration errors abort the whole conversion; the caller shipped
    /// a rule set that cannot run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownStep { .. }
                | Self::InvalidStep { .. }
                | Self::InvalidArgument { .. }
                | Self::Pattern { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
