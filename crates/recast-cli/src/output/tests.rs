// Tests for output formatting
//
// These tests capture what the writer emits for each output format.

use super::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

#[test]
fn test_json_data_is_compact() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.data(&json!({"name": "ADA", "phone": "(123)456-7890"})).unwrap();
    assert_eq!(buffer.contents(), "{\"name\":\"ADA\",\"phone\":\"(123)456-7890\"}\n");
}

#[test]
fn test_yaml_data() {
    let (mut output, buffer) = writer(OutputFormat::Yaml, false);
    output.data(&json!({"name": "ADA"})).unwrap();
    assert_eq!(buffer.contents(), "name: ADA\n");
}

#[test]
fn test_data_is_never_redacted_in_output() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.data(&json!({"password": "hunter2"})).unwrap();
    assert!(buffer.contents().contains("hunter2"));
}

#[test]
fn test_messages_only_in_human_format() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.info("converting").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    output.section("Rules").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output.info("converting").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    output.error("broken").unwrap();
    assert_eq!(
        buffer.contents(),
        "INFO: converting\ndone\nWARNING: careful\nERROR: broken\n"
    );
}

#[test]
fn test_quiet_suppresses_info_but_not_warnings() {
    let (mut output, buffer) = writer(OutputFormat::Human, true);
    output.info("converting").unwrap();
    output.success("done").unwrap();
    output.warning("careful").unwrap();
    assert_eq!(buffer.contents(), "WARNING: careful\n");
}

#[test]
fn test_table_alignment() {
    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output
        .table(
            &["Pattern", "Steps"],
            vec![
                vec!["name".to_string(), "trim|toUpper".to_string()],
                vec!["phone_*".to_string(), "phone".to_string()],
            ],
        )
        .unwrap();

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "Pattern │ Steps");
    assert_eq!(lines[1], "────────┼─────────────");
    assert_eq!(lines[2], "name    │ trim|toUpper");
    assert_eq!(lines[3], "phone_* │ phone");
}
