//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod apply;
mod check;
mod completions;
mod functions;
mod utils;

pub use apply::handle_apply;
pub use check::handle_check;
pub use completions::handle_completions;
pub use functions::handle_functions;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ApplyArgs, CheckArgs, OutputFormat};
    use crate::config::{Config, ConfigBuilder};
    use crate::error::Error;
    use crate::output::OutputWriter;
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer(format: OutputFormat) -> (OutputWriter, Captured) {
        let captured = Captured::default();
        (
            OutputWriter::with_writer(format, false, false, Box::new(captured.clone())),
            captured,
        )
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn apply_args(input: PathBuf, rules: PathBuf) -> ApplyArgs {
        ApplyArgs {
            input,
            rules,
            save_to: None,
            float_arithmetic: false,
        }
    }

    fn precise_config() -> Config {
        ConfigBuilder::new().precise_arithmetic(true).build()
    }

    #[test]
    fn test_apply_single_record() {
        let dir = TempDir::new().unwrap();
        let input = write_file(
            dir.path(),
            "person.json",
            r#"{"name": "  ada  ", "phone_home": "123.456.7890", "phone_work": "", "total": "4"}"#,
        );
        let rules = write_file(
            dir.path(),
            "rules.yaml",
            "name: trim|toUpper\nphone_*: bailIfEmpty|onlyNumbers|phone\ntotal:\n  - add:2\n",
        );

        let (mut output, captured) = writer(OutputFormat::Json);
        handle_apply(apply_args(input, rules), &precise_config(), &mut output).unwrap();

        let converted: serde_json::Value = serde_json::from_str(captured.text().trim()).unwrap();
        assert_eq!(
            converted,
            json!({"name": "ADA", "phone_home": "(123)456-7890", "phone_work": "", "total": "6"})
        );
    }

    #[test]
    fn test_apply_list_and_save_yaml() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "people.yaml", "- name: ' a '\n- name: ' b '\n");
        let rules = write_file(dir.path(), "rules.json", r#"{"name": "trim|suffix:x"}"#);
        let save_to = dir.path().join("out.yaml");

        let mut args = apply_args(input, rules);
        args.save_to = Some(save_to.clone());
        let (mut output, captured) = writer(OutputFormat::Human);
        handle_apply(args, &precise_config(), &mut output).unwrap();

        assert_eq!(fs::read_to_string(&save_to).unwrap(), "- name: ax\n- name: bx\n");
        let text = captured.text();
        assert!(text.contains("Converted 2 record(s)"));
        assert!(text.contains("Output saved to"));
    }

    #[test]
    fn test_apply_refuses_to_overwrite_input() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "person.json", r#"{"a": "x"}"#);
        let rules = write_file(dir.path(), "rules.json", r#"{"a": "trim"}"#);

        let mut args = apply_args(input.clone(), rules);
        args.save_to = Some(input);
        let (mut output, _) = writer(OutputFormat::Json);
        let err = handle_apply(args, &precise_config(), &mut output).unwrap_err();
        assert!(err.should_show_help());
    }

    #[test]
    fn test_apply_unknown_step_fails_with_core_error() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "person.json", r#"{"a": "x"}"#);
        let rules = write_file(dir.path(), "rules.json", r#"{"a": "frobnicate"}"#);

        let (mut output, captured) = writer(OutputFormat::Json);
        let err = handle_apply(apply_args(input, rules), &precise_config(), &mut output).unwrap_err();
        assert!(matches!(err, Error::Core(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(captured.text(), "");
    }

    #[test]
    fn test_apply_float_flag_rounds() {
        let dir = TempDir::new().unwrap();
        let input = write_file(dir.path(), "n.json", r#"{"n": "2"}"#);
        let rules = write_file(dir.path(), "rules.json", r#"{"n": "divide:3,3"}"#);

        let mut args = apply_args(input.clone(), rules.clone());
        args.float_arithmetic = true;
        let (mut output, captured) = writer(OutputFormat::Json);
        handle_apply(args, &precise_config(), &mut output).unwrap();
        assert_eq!(captured.text().trim(), r#"{"n":"0.667"}"#);

        let (mut output, captured) = writer(OutputFormat::Json);
        handle_apply(apply_args(input, rules), &precise_config(), &mut output).unwrap();
        assert_eq!(captured.text().trim(), r#"{"n":"0.666"}"#);
    }

    #[test]
    fn test_check_reports_json() {
        let dir = TempDir::new().unwrap();
        let rules = write_file(
            dir.path(),
            "rules.yaml",
            "due: toDate|addDays:1\nname: trim\n",
        );

        let (mut output, captured) = writer(OutputFormat::Json);
        handle_check(CheckArgs { rules }, &precise_config(), &mut output).unwrap();

        let report: serde_json::Value = serde_json::from_str(captured.text().trim()).unwrap();
        assert_eq!(report[0]["pattern"], "due");
        assert_eq!(report[0]["unresolved"], json!(["addDays"]));
        assert_eq!(report[1]["steps"], json!(["trim"]));
    }

    #[test]
    fn test_check_fails_on_malformed_rule() {
        let dir = TempDir::new().unwrap();
        let rules = write_file(dir.path(), "rules.json", r#"{"a": "trim||toUpper"}"#);

        let (mut output, captured) = writer(OutputFormat::Human);
        let err = handle_check(CheckArgs { rules }, &precise_config(), &mut output).unwrap_err();
        assert!(err.to_string().contains("1 rule(s) failed to compile"));
        assert!(captured.text().contains("ERROR: ✗ Rule 'a'"));
    }

    #[test]
    fn test_functions_listing() {
        let (mut output, captured) = writer(OutputFormat::Json);
        handle_functions(&precise_config(), &mut output).unwrap();

        let listing: serde_json::Value = serde_json::from_str(captured.text().trim()).unwrap();
        let names = listing["functions"].as_array().unwrap();
        assert!(names.contains(&json!("trim")));
        assert!(names.contains(&json!("toDate")));
        assert_eq!(listing["directives"], json!(["bailIfEmpty"]));
        assert_eq!(listing["precise_arithmetic"], json!(true));
    }
}
