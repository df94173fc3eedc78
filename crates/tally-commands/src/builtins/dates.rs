//! Date inference and date-part extraction commands.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::command::{Command, CommandError};
use crate::metadata::{CommandMetadata, CommandParameter, DataType};
use tally_core::Value;

/// Formats that carry a time component, tried before the date-only set.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",     // 2024-01-15 12:30:45
    "%Y-%m-%dT%H:%M:%S",     // 2024-01-15T12:30:45 (ISO format)
    "%Y-%m-%dT%H:%M:%SZ",    // 2024-01-15T12:30:45Z (ISO with Z)
    "%Y-%m-%d %H:%M",        // 2024-01-15 12:30
    "%m/%d/%Y %H:%M:%S",     // 01/15/2024 12:30:45
    "%m/%d/%Y %H:%M",        // 01/15/2024 12:30
    "%d-%b-%Y %H:%M:%S",     // 15-Jan-2024 12:30:45
    "%d-%b-%Y %H:%M",        // 15-Jan-2024 12:30
    "%Y-%m-%d %I:%M:%S %p",  // 2024-01-15 02:30:45 PM
    "%Y-%m-%d %I:%M %p",     // 2024-01-15 02:30 PM
    "%m/%d/%Y %I:%M:%S %p",  // 01/15/2024 02:30:45 PM
    "%m/%d/%Y %I:%M %p",     // 01/15/2024 02:30 PM
    "%d-%b-%Y %I:%M:%S %p",  // 15-Jan-2024 02:30:45 PM
    "%d-%b-%Y %I:%M %p",     // 15-Jan-2024 02:30 PM
    "%a, %d %b %Y %H:%M:%S", // Mon, 15 Jan 2024 14:30:00 (RFC 2822-like)
];

/// Date-only formats; successful parses land on midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-01-15
    "%m/%d/%Y", // 01/15/2024
    "%d-%b-%Y", // 15-Jan-2024
    "%m/%d/%y", // 01/15/24
    "%d/%m/%Y", // 15/01/2024
    "%Y/%m/%d", // 2024/01/15
    "%d.%m.%Y", // 15.01.2024
    "%b %d, %Y", // Jan 15, 2024
    "%B %d, %Y", // January 15, 2024
];

/// Best-effort parse of free-form date text: RFC 3339 first, then the
/// known datetime formats, then date-only formats. First success wins.
pub(crate) fn infer_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Date view shared by the extraction commands: dates pass through,
/// strings go through inference, everything else has no date.
fn coerce_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Str(s) => infer_date(s),
        _ => None,
    }
}

/// `date_infer(date_string)` - parse a date or datetime from text.
pub struct DateInfer;

impl Command for DateInfer {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "date_infer".into(),
            description:
                "Automatically infer date/datetime format and parse date or datetime string".into(),
            category: "date".into(),
            parameters: vec![CommandParameter::required(
                "date_string",
                DataType::String,
                "String containing date or datetime to parse",
            )],
            return_type: DataType::Date,
            examples: vec![
                "date_infer('2024-01-15')".into(),
                "date_infer('01/15/2024 14:30:00')".into(),
                "date_infer('15-Jan-2024 2:30 PM')".into(),
                "date_infer('2024-12-31T23:59:59')".into(),
                "date_infer('Mon, 15 Jan 2024 14:30:00')".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(coerce_date(&args[0]).map(Value::Date).unwrap_or(Value::Null))
    }
}

/// `date_month(date)` - month name of a date or date string.
pub struct DateMonth;

impl Command for DateMonth {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "date_month".into(),
            description: "Extract the month name from a date or date string".into(),
            category: "date".into(),
            parameters: vec![CommandParameter::required(
                "date",
                DataType::Date,
                "Date value or parseable date string",
            )],
            return_type: DataType::String,
            examples: vec![
                "date_month(transaction_date)".into(),
                "date_month('2024-01-15')".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(coerce_date(&args[0])
            .map(|d| Value::Str(d.format("%B").to_string()))
            .unwrap_or(Value::Null))
    }
}

/// `date_week(date)` - ISO week number of a date or date string.
pub struct DateWeek;

impl Command for DateWeek {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "date_week".into(),
            description: "Extract the ISO week number from a date or date string".into(),
            category: "date".into(),
            parameters: vec![CommandParameter::required(
                "date",
                DataType::Date,
                "Date value or parseable date string",
            )],
            return_type: DataType::Integer,
            examples: vec![
                "date_week(transaction_date)".into(),
                "date_week('2024-01-15')".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(coerce_date(&args[0])
            .map(|d| Value::Int(i64::from(d.iso_week().week())))
            .unwrap_or(Value::Null))
    }
}

/// `date_weekday(date)` - weekday name of a date or date string.
pub struct DateWeekday;

impl Command for DateWeekday {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "date_weekday".into(),
            description: "Extract the weekday name from a date or date string".into(),
            category: "date".into(),
            parameters: vec![CommandParameter::required(
                "date",
                DataType::Date,
                "Date value or parseable date string",
            )],
            return_type: DataType::String,
            examples: vec![
                "date_weekday(transaction_date)".into(),
                "date_weekday('2024-01-15')".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(coerce_date(&args[0])
            .map(|d| Value::Str(d.format("%A").to_string()))
            .unwrap_or(Value::Null))
    }
}
