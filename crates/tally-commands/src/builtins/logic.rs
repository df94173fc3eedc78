//! Type-aware equality and null-defaulting.

use std::ops::RangeInclusive;

use crate::command::{Command, CommandError};
use crate::metadata::{CommandMetadata, CommandParameter, DataType};
use tally_core::Value;

/// Canonical boolean view: real booleans, 1/0 numerics (including 1.0 and
/// 0.0), and the "true"/"false"/"1"/"0" string tokens.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(1) => Some(true),
        Value::Int(0) => Some(false),
        Value::Float(f) if *f == 1.0 => Some(true),
        Value::Float(f) if *f == 0.0 => Some(false),
        Value::Str(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numeric view including numeric strings, used for cross-type equality.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// `equals(left, right, case_sensitive=true)` - type-aware equality.
pub struct Equals;

impl Equals {
    /// The comparison body, checked in order: null semantics, boolean
    /// coercion when either side is a boolean, numeric comparison
    /// (numbers and numeric strings as floats), string comparison
    /// honoring the flag, then structural fallback for dates and lists.
    fn compare(left: &Value, right: &Value, case_sensitive: bool) -> bool {
        if left.is_null() || right.is_null() {
            return left.is_null() && right.is_null();
        }

        if matches!(left, Value::Bool(_)) || matches!(right, Value::Bool(_)) {
            return match (coerce_bool(left), coerce_bool(right)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
        }

        if let (Some(a), Some(b)) = (coerce_number(left), coerce_number(right)) {
            return a == b;
        }

        if let (Value::Str(a), Value::Str(b)) = (left, right) {
            return if case_sensitive {
                a == b
            } else {
                a.to_lowercase() == b.to_lowercase()
            };
        }

        left.loose_eq(right)
    }
}

impl Command for Equals {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "equals".into(),
            description: "Compare two values for equality with type-aware coercion".into(),
            category: "logic".into(),
            parameters: vec![
                CommandParameter::required("left", DataType::Any, "First value to compare"),
                CommandParameter::required("right", DataType::Any, "Second value to compare"),
                CommandParameter::optional(
                    "case_sensitive",
                    DataType::Boolean,
                    "Whether string comparison is case sensitive",
                    Value::Bool(true),
                ),
            ],
            return_type: DataType::Boolean,
            examples: vec![
                "equals(merchant, 'Amazon')".into(),
                "equals(merchant, 'amazon', False)".into(),
                "equals(amount_to_float(amount), 100.0)".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=3
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        let case_sensitive = args.get(2).map(Value::truthy).unwrap_or(true);
        Ok(Value::Bool(Self::compare(&args[0], &args[1], case_sensitive)))
    }
}

/// `default_if_none(value, default)` - substitute a default for null.
pub struct DefaultIfNone;

impl Command for DefaultIfNone {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "default_if_none".into(),
            description: "Return the default when the value is null, otherwise the value".into(),
            category: "utility".into(),
            parameters: vec![
                CommandParameter::required("value", DataType::Any, "Value to check"),
                CommandParameter::required("default", DataType::Any, "Replacement for null"),
            ],
            return_type: DataType::Any,
            examples: vec![
                "default_if_none(amount_to_float(money_in), 0)".into(),
                "default_if_none(category, 'Uncategorized')".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(if args[0].is_null() {
            args[1].clone()
        } else {
            args[0].clone()
        })
    }
}
