//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//!
//! Command-line flags and environment variables are applied on top by the
//! callers that own them.

use crate::error::{Error, Result};
use recast_core::Capabilities;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Arithmetic backend settings
    pub arithmetic: ArithmeticConfig,

    /// Path settings
    pub paths: PathConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

/// Arithmetic configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArithmeticConfig {
    /// Force the decimal backend on or off; unset uses the process probe
    pub precise: Option<bool>,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory searched for rule files given by bare name
    pub rules_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            rules_dir: config_dir.join("recast").join("rules"),
        }
    }
}

impl ArithmeticConfig {
    /// Capabilities for the converter; `float_flag` forces the float backend
    pub fn capabilities(&self, float_flag: bool) -> Capabilities {
        if float_flag {
            return Capabilities::float_only();
        }
        match self.precise {
            Some(precise) => Capabilities {
                precise_arithmetic: precise,
            },
            None => Capabilities::detect(),
        }
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let parsed = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| Error::config(format!("{}: {}", path.display(), message)))
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".recast.yaml"),
            PathBuf::from(".recast.json"),
            PathBuf::from("recast.yaml"),
            PathBuf::from("recast.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let recast_dir = config_dir.join("recast");
            paths.push(recast_dir.join("config.yaml"));
            paths.push(recast_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".recast.yaml"));
            paths.push(home_dir.join(".recast.json"));
        }

        paths
    }
}

/// Builder for creating configurations programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

#[allow(dead_code)]
impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default output format
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output.format = format.into();
        self
    }

    /// Pin the arithmetic backend
    pub fn precise_arithmetic(mut self, precise: bool) -> Self {
        self.config.arithmetic.precise = Some(precise);
        self
    }

    /// Set the directory searched for bare rule names
    pub fn rules_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.paths.rules_dir = dir.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
