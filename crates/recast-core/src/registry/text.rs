//! Text built-ins
//!
//! Strings and numbers are treated as text; every other leaf passes through.

use super::{bool_arg, int_arg, optional_arg, required_arg, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::value::Value;

pub(crate) fn register(registry: &mut BuiltinRegistry) {
    registry.register("trim", trim);
    registry.register("ltrim", ltrim);
    registry.register("rtrim", rtrim);
    registry.register("toLower", to_lower);
    registry.register("toUpper", to_upper);
    registry.register("truncate", truncate);
    registry.register("phone", phone);
    registry.register("insertEvery", insert_every);
    registry.register("onlyLetters", only_letters);
    registry.register("onlyNumbers", only_numbers);
    registry.register("onlyAlphaNumeric", only_alpha_numeric);
    registry.register("singleSpaceBetweenWords", single_space_between_words);
    registry.register("prefix", prefix);
    registry.register("suffix", suffix);
    registry.register("explode", explode);
    registry.register("toBoolean", to_boolean);
}

/// Apply `f` to the text of a leaf, passing non-text leaves through
fn map_text<F>(value: Value, f: F) -> Value
where
    F: FnOnce(&str) -> String,
{
    let mapped = value.text().map(|text| f(&text));
    match mapped {
        Some(text) => Value::String(text),
        None => value,
    }
}

/// `trim(chars=" ")`: strip the given characters from both ends
pub fn trim(value: Value, args: &[String]) -> Result<Value> {
    let chars = optional_arg(args, 0, " ");
    Ok(map_text(value, |text| text.trim_matches(|c: char| chars.contains(c)).to_string()))
}

/// `ltrim(chars=" ")`
pub fn ltrim(value: Value, args: &[String]) -> Result<Value> {
    let chars = optional_arg(args, 0, " ");
    Ok(map_text(value, |text| text.trim_start_matches(|c: char| chars.contains(c)).to_string()))
}

/// `rtrim(chars=" ")`
pub fn rtrim(value: Value, args: &[String]) -> Result<Value> {
    let chars = optional_arg(args, 0, " ");
    Ok(map_text(value, |text| text.trim_end_matches(|c: char| chars.contains(c)).to_string()))
}

pub fn to_lower(value: Value, _args: &[String]) -> Result<Value> {
    Ok(map_text(value, str::to_lowercase))
}

pub fn to_upper(value: Value, _args: &[String]) -> Result<Value> {
    Ok(map_text(value, str::to_uppercase))
}

/// `truncate(count=0)`: drop the last `count` characters
pub fn truncate(value: Value, args: &[String]) -> Result<Value> {
    let count = int_arg("truncate", args, 0, "count", 0)?;
    let count = usize::try_from(count)
        .map_err(|_| Error::invalid_argument("truncate", args.first().map(String::as_str), "count must not be negative"))?;
    Ok(map_text(value, |text| {
        let keep = text.chars().count().saturating_sub(count);
        text.chars().take(keep).collect()
    }))
}

/// `phone`: `(xxx)xxx-xxxx` for ten digits, `x(xxx)xxx-xxxx` for eleven
pub fn phone(value: Value, _args: &[String]) -> Result<Value> {
    let formatted = value.text().and_then(|text| format_phone(&text));
    Ok(formatted.map(Value::String).unwrap_or(value))
}

fn format_phone(text: &str) -> Option<String> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match text.len() {
        10 => Some(format!("({}){}-{}", &text[..3], &text[3..6], &text[6..])),
        11 => Some(format!("{}({}){}-{}", &text[..1], &text[1..4], &text[4..7], &text[7..])),
        _ => None,
    }
}

/// `insertEvery(nth, insert)`: put `insert` between every `nth` characters
pub fn insert_every(value: Value, args: &[String]) -> Result<Value> {
    let raw_nth = required_arg("insertEvery", args, 0, "nth")?;
    let nth = int_arg("insertEvery", args, 0, "nth", 0)?;
    if nth <= 0 {
        return Err(Error::invalid_argument("insertEvery", Some(raw_nth), "nth must be positive"));
    }
    let insert = required_arg("insertEvery", args, 1, "insert")?;
    let nth = usize::try_from(nth).unwrap_or(usize::MAX);

    Ok(map_text(value, |text| {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(nth)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(insert)
    }))
}

/// `onlyLetters`: keep Unicode letters
pub fn only_letters(value: Value, _args: &[String]) -> Result<Value> {
    Ok(map_text(value, |text| text.chars().filter(|c| c.is_alphabetic()).collect()))
}

/// `onlyNumbers`: keep ASCII digits
pub fn only_numbers(value: Value, _args: &[String]) -> Result<Value> {
    Ok(map_text(value, |text| text.chars().filter(char::is_ascii_digit).collect()))
}

/// `onlyAlphaNumeric(allowSpaces=false)`: keep ASCII letters and digits
pub fn only_alpha_numeric(value: Value, args: &[String]) -> Result<Value> {
    let allow_spaces = bool_arg(args, 0, false);
    Ok(map_text(value, |text| {
        text.chars()
            .filter(|c| c.is_ascii_alphanumeric() || (allow_spaces && *c == ' '))
            .collect()
    }))
}

/// `singleSpaceBetweenWords`: trim and collapse whitespace runs to one space
pub fn single_space_between_words(value: Value, _args: &[String]) -> Result<Value> {
    Ok(map_text(value, |text| text.split_whitespace().collect::<Vec<_>>().join(" ")))
}

/// `prefix(text)`
pub fn prefix(value: Value, args: &[String]) -> Result<Value> {
    let head = required_arg("prefix", args, 0, "text")?;
    Ok(map_text(value, |text| format!("{}{}", head, text)))
}

/// `suffix(text)`
pub fn suffix(value: Value, args: &[String]) -> Result<Value> {
    let tail = required_arg("suffix", args, 0, "text")?;
    Ok(map_text(value, |text| format!("{}{}", text, tail)))
}

/// `explode(delimiter=",")`: split a string into an array of strings
pub fn explode(value: Value, args: &[String]) -> Result<Value> {
    let delimiter = optional_arg(args, 0, ",");
    if delimiter.is_empty() {
        return Err(Error::invalid_argument("explode", Some(delimiter), "delimiter must not be empty"));
    }
    match value {
        Value::String(text) => Ok(Value::Array(
            text.split(delimiter).map(|part| Value::String(part.to_string())).collect(),
        )),
        other => Ok(other),
    }
}

/// `toBoolean`: `true`, `1`, `yes`, `on` (any case) are true, everything
/// else is false
pub fn to_boolean(value: Value, _args: &[String]) -> Result<Value> {
    let result = match &value {
        Value::Bool(b) => *b,
        Value::Int(n) => *n == 1,
        Value::Float(f) => *f == 1.0,
        Value::String(s) => truthy(s),
        _ => false,
    };
    Ok(Value::Bool(result))
}

pub(crate) fn truthy(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
