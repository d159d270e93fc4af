//! Shared utilities for command handlers

use crate::config::{is_yaml, Config};
use crate::error::{Error, Result};
use recast_core::{Converter, RuleSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const RULE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Locate a rule file: an existing path, else `<rules_dir>/<name>.{yaml,yml,json}`
pub fn resolve_rules_path(rules: &Path, config: &Config) -> Result<PathBuf> {
    if rules.exists() {
        return Ok(rules.to_path_buf());
    }

    // Only bare names are looked up in the rules directory
    if rules.components().count() == 1 {
        let candidates = if rules.extension().is_some() {
            vec![config.paths.rules_dir.join(rules)]
        } else {
            RULE_EXTENSIONS
                .iter()
                .map(|ext| config.paths.rules_dir.join(rules).with_extension(ext))
                .collect()
        };

        if let Some(found) = candidates.into_iter().find(|p| p.exists()) {
            debug!(rules = %found.display(), "Resolved rule file from rules directory");
            return Ok(found);
        }
    }

    Err(Error::FileNotFound {
        path: rules.to_path_buf(),
    })
}

/// Read a JSON or YAML document (by extension) into a JSON value
pub fn read_document(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Read document");

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| {
            debug!(error = %e, "YAML parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "YAML".to_string(),
            }
        })
    } else {
        serde_json::from_str(&content).map_err(|e| {
            debug!(error = %e, "JSON parse failed");
            Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON".to_string(),
            }
        })
    }
}

/// Load a rule set: a map of key pattern to pipe string or list of descriptors
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let document = read_document(path)?;
    if !document.is_object() {
        return Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "a map of key patterns to steps".to_string(),
        });
    }
    Ok(serde_json::from_value(document)?)
}

/// Serialize a document for a file, YAML when the extension says so
pub fn render_document(path: &Path, value: &serde_json::Value) -> Result<String> {
    if is_yaml(path) {
        Ok(serde_yaml::to_string(value)?)
    } else {
        let mut rendered = serde_json::to_string_pretty(value)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

/// Converter honoring the configured arithmetic backend
pub fn build_converter(config: &Config, float_arithmetic: bool) -> Converter {
    Converter::builder()
        .capabilities(config.arithmetic.capabilities(float_arithmetic))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_rules_resolve_from_rules_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("people.yaml"), "name: trim\n").unwrap();
        let config = ConfigBuilder::new().rules_dir(dir.path()).build();

        let resolved = resolve_rules_path(Path::new("people"), &config).unwrap();
        assert_eq!(resolved, dir.path().join("people.yaml"));

        let resolved = resolve_rules_path(Path::new("people.yaml"), &config).unwrap();
        assert_eq!(resolved, dir.path().join("people.yaml"));

        let err = resolve_rules_path(Path::new("missing"), &config).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_paths_with_directories_are_not_searched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("people.yaml"), "name: trim\n").unwrap();
        let config = ConfigBuilder::new().rules_dir(dir.path()).build();

        assert!(resolve_rules_path(Path::new("nested/people"), &config).is_err());
    }

    #[test]
    fn test_load_yaml_rules_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.yaml");
        fs::write(
            &path,
            "phone_*: \"bailIfEmpty|onlyNumbers|phone\"\nname:\n  - trim\n  - toUpper\n",
        )
        .unwrap();

        let rules = load_rules(&path).unwrap();
        assert_eq!(rules.patterns().collect::<Vec<_>>(), vec!["phone_*", "name"]);
    }

    #[test]
    fn test_rules_must_be_a_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, r#"["trim"]"#).unwrap();

        assert!(matches!(load_rules(&path), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_malformed_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        fs::write(&path, "{ nope").unwrap();

        match read_document(&path) {
            Err(Error::InvalidFormat { expected, .. }) => assert_eq!(expected, "JSON"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_render_document_by_extension() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(render_document(Path::new("out.yaml"), &value).unwrap(), "a: 1\n");
        assert_eq!(
            render_document(Path::new("out.json"), &value).unwrap(),
            "{\n  \"a\": 1\n}\n"
        );
    }
}
