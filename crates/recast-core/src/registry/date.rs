//! Date parsing and the date delegate
//!
//! `toDate` turns text into a [`DateValue`] leaf. The registry has no date
//! arithmetic of its own: steps such as `addDays:1` or `format:m/d/Y` that
//! follow `toDate` in a pipeline are answered by the date value itself
//! through [`Transformable`].

use super::{int_arg, required_arg, BuiltinRegistry};
use crate::error::{Error, Result};
use crate::value::{Transformable, Value};
use chrono::{DateTime, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

const METHODS: &[&str] = &[
    "addDays",
    "subDays",
    "addWeeks",
    "subWeeks",
    "addMonths",
    "subMonths",
    "addYears",
    "subYears",
    "addHours",
    "subHours",
    "addMinutes",
    "subMinutes",
    "startOfDay",
    "endOfDay",
    "format",
    "toDateString",
    "toDateTimeString",
    "timestamp",
];

pub(crate) fn register(registry: &mut BuiltinRegistry) {
    registry.register("toDate", to_date);
}

/// `toDate`: parse text into a date leaf.
///
/// Accepted text: the relative words `now`, `today`, `tomorrow` and
/// `yesterday`, `@<unix seconds>`, RFC 3339, and the fixed layouts
/// `Y-m-d H:i:s`, `Y-m-d\TH:i:s`, `Y-m-d H:i`, `m/d/Y H:i:s`, `Y-m-d`,
/// `m/d/Y` and `d-m-Y`. Free-form relative phrases such as `next monday` or
/// `+1 week` are not understood.
///
/// `Null` parses as the current local time. Text that matches none of the
/// accepted formats, and leaves that are not text, pass through unchanged.
pub fn to_date(value: Value, _args: &[String]) -> Result<Value> {
    let parsed = match &value {
        Value::Null => Some(DateValue::now()),
        Value::String(text) => DateValue::parse(text),
        _ => None,
    };
    Ok(parsed.map(Value::object).unwrap_or(value))
}

/// A local date and time without zone information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateValue {
    inner: NaiveDateTime,
}

impl DateValue {
    pub fn new(inner: NaiveDateTime) -> Self {
        Self { inner }
    }

    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Parse one of the accepted textual forms
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let today = Local::now().date_naive();

        match text.to_ascii_lowercase().as_str() {
            "now" => return Some(Self::now()),
            "today" => return Some(Self::new(today.and_time(NaiveTime::MIN))),
            "tomorrow" => return today.succ_opt().map(|d| Self::new(d.and_time(NaiveTime::MIN))),
            "yesterday" => return today.pred_opt().map(|d| Self::new(d.and_time(NaiveTime::MIN))),
            _ => {}
        }

        if let Some(seconds) = text.strip_prefix('@') {
            let seconds = seconds.parse::<i64>().ok()?;
            return DateTime::from_timestamp(seconds, 0).map(|dt| Self::new(dt.naive_utc()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::new(dt.naive_local()));
        }

        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .map(Self::new)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.inner
    }

    /// Render with date-format letters (`Y-m-d`, `m/d/Y H:i`, ...)
    pub fn format(&self, pattern: &str) -> String {
        let mut spec = String::with_capacity(pattern.len() * 2);
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            let item = match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        push_literal(&mut spec, escaped);
                    }
                    continue;
                }
                'd' => "%d",
                'j' => "%-d",
                'D' => "%a",
                'l' => "%A",
                'N' => "%u",
                'm' => "%m",
                'n' => "%-m",
                'M' => "%b",
                'F' => "%B",
                'Y' => "%Y",
                'y' => "%y",
                'H' => "%H",
                'G' => "%-H",
                'h' => "%I",
                'g' => "%-I",
                'i' => "%M",
                's' => "%S",
                'A' => "%p",
                'a' => "%P",
                'U' => {
                    spec.push_str(&self.timestamp().to_string());
                    continue;
                }
                other => {
                    push_literal(&mut spec, other);
                    continue;
                }
            };
            spec.push_str(item);
        }

        self.inner.format(&spec).to_string()
    }

    /// Seconds since the epoch, reading the local time as UTC
    pub fn timestamp(&self) -> i64 {
        self.inner.and_utc().timestamp()
    }

    fn shifted(&self, method: &str, args: &[String]) -> Result<Option<NaiveDateTime>> {
        let amount = int_arg(method, args, 0, "amount", 1)?;
        let out_of_range = || Error::invalid_argument(method, args.first().map(String::as_str), "amount is out of range");

        let (forward, unit) = match method.strip_prefix("add") {
            Some(unit) => (true, unit),
            None => (false, method.trim_start_matches("sub")),
        };
        let amount = if forward { amount } else { amount.checked_neg().ok_or_else(out_of_range)? };

        let shifted = match unit {
            "Days" => Duration::try_days(amount).and_then(|d| self.inner.checked_add_signed(d)),
            "Weeks" => Duration::try_weeks(amount).and_then(|d| self.inner.checked_add_signed(d)),
            "Hours" => Duration::try_hours(amount).and_then(|d| self.inner.checked_add_signed(d)),
            "Minutes" => Duration::try_minutes(amount).and_then(|d| self.inner.checked_add_signed(d)),
            "Months" => shift_months(self.inner, amount),
            "Years" => amount.checked_mul(12).and_then(|months| shift_months(self.inner, months)),
            _ => return Ok(None),
        };
        shifted.map(Some).ok_or_else(out_of_range)
    }
}

fn shift_months(date: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

fn push_literal(spec: &mut String, c: char) {
    if c == '%' {
        spec.push_str("%%");
    } else {
        spec.push(c);
    }
}

impl Transformable for DateValue {
    fn kind(&self) -> &'static str {
        "date"
    }

    fn responds_to(&self, method: &str) -> bool {
        METHODS.contains(&method)
    }

    fn invoke(&self, method: &str, args: &[String]) -> Result<Value> {
        let value = match method {
            "startOfDay" => Value::object(Self::new(self.inner.date().and_time(NaiveTime::MIN))),
            "endOfDay" => {
                let end = self.inner.date().and_hms_opt(23, 59, 59).unwrap_or(self.inner);
                Value::object(Self::new(end))
            }
            "format" => Value::String(self.format(required_arg(method, args, 0, "format")?)),
            "toDateString" => Value::String(self.format("Y-m-d")),
            "toDateTimeString" => Value::String(self.format("Y-m-d H:i:s")),
            "timestamp" => Value::Int(self.timestamp()),
            _ => match self.shifted(method, args)? {
                Some(shifted) => Value::object(Self::new(shifted)),
                None => {
                    return Err(Error::UnknownStep {
                        name: method.to_string(),
                        value_kind: self.kind().to_string(),
                    })
                }
            },
        };
        Ok(value)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.inner.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}
