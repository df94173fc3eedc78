//! Regex extraction over record text.

use std::ops::RangeInclusive;

use regex::{Regex, RegexBuilder};

use crate::command::{Command, CommandError};
use crate::constants::{MAX_REGEX_LENGTH, REGEX_DFA_SIZE_LIMIT, REGEX_SIZE_LIMIT};
use crate::metadata::{CommandMetadata, CommandParameter, DataType};
use tally_core::Value;

/// Compile a user-authored regex with size limits.
///
/// Rule editors supply these patterns, so compilation is bounded:
/// pattern length, compiled program size, and DFA size all have caps to
/// keep a pathological pattern from exhausting memory or CPU.
pub(crate) fn compile_regex_safe(pattern: &str) -> Result<Regex, CommandError> {
    if pattern.len() > MAX_REGEX_LENGTH {
        return Err(CommandError::InvalidPattern(format!(
            "Pattern exceeds maximum length of {MAX_REGEX_LENGTH} characters"
        )));
    }

    RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
        .build()
        .map_err(|e| CommandError::InvalidPattern(e.to_string()))
}

/// `regex(pattern, text, return_all=false, group_index=0)`
///
/// With `return_all = false`, returns the first match - the whole match
/// text for `group_index = 0`, or the requested capture group - or null
/// when nothing matches. With `return_all = true`, returns the list of
/// all matches (or all values of the requested group).
pub struct RegexExtract;

impl Command for RegexExtract {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "regex".into(),
            description: "Extract text matching a regular expression pattern".into(),
            category: "text".into(),
            parameters: vec![
                CommandParameter::required(
                    "pattern",
                    DataType::String,
                    "Regular expression pattern to match",
                ),
                CommandParameter::required("text", DataType::Any, "Text to search in"),
                CommandParameter::optional(
                    "return_all",
                    DataType::Boolean,
                    "Return all matches instead of the first",
                    Value::Bool(false),
                ),
                CommandParameter::optional(
                    "group_index",
                    DataType::Integer,
                    "Capture group to return (0 = whole match)",
                    Value::Int(0),
                ),
            ],
            return_type: DataType::Any,
            examples: vec![
                "regex('\\d+', description)".into(),
                "regex('(\\d{4})-(\\d{2})-(\\d{2})', posting_date, False, 1)".into(),
                "regex('[A-Z]{2,}', merchant, True)".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=4
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        let pattern = args[0].as_str().ok_or(CommandError::NotConvertible {
            type_name: args[0].type_name(),
            expected: "string pattern",
        })?;
        if args[1].is_null() {
            return Ok(Value::Null);
        }
        let text = args[1].to_text();
        let return_all = args.get(2).map(Value::truthy).unwrap_or(false);
        let group_index = match args.get(3) {
            None => 0,
            Some(Value::Int(i)) if *i >= 0 => *i as usize,
            Some(other) => {
                return Err(CommandError::NotConvertible {
                    type_name: other.type_name(),
                    expected: "non-negative group index",
                })
            }
        };

        let re = compile_regex_safe(pattern)?;
        if group_index >= re.captures_len() {
            return Err(CommandError::InvalidPattern(format!(
                "Pattern has no capture group {group_index}"
            )));
        }

        if return_all {
            let matches: Vec<Value> = re
                .captures_iter(&text)
                .filter_map(|caps| caps.get(group_index))
                .map(|m| Value::Str(m.as_str().to_string()))
                .collect();
            Ok(Value::List(matches))
        } else {
            Ok(re
                .captures(&text)
                .and_then(|caps| caps.get(group_index))
                .map(|m| Value::Str(m.as_str().to_string()))
                .unwrap_or(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(args: &[Value]) -> Result<Value, CommandError> {
        RegexExtract.invoke(args)
    }

    #[test]
    fn test_first_whole_match() {
        let out = extract(&[
            Value::Str("\\d+".into()),
            Value::Str("order 123 of 456".into()),
        ])
        .unwrap();
        assert_eq!(out, Value::Str("123".into()));
    }

    #[test]
    fn test_capture_groups() {
        let pattern = Value::Str("(\\d{4})-(\\d{2})-(\\d{2})".into());
        let text = Value::Str("Date: 2024-01-15".into());
        for (group, expected) in [(1, "2024"), (2, "01"), (3, "15")] {
            let out = extract(&[
                pattern.clone(),
                text.clone(),
                Value::Bool(false),
                Value::Int(group),
            ])
            .unwrap();
            assert_eq!(out, Value::Str(expected.into()));
        }
    }

    #[test]
    fn test_return_all() {
        let out = extract(&[
            Value::Str("\\d+".into()),
            Value::Str("1 and 22 and 333".into()),
            Value::Bool(true),
        ])
        .unwrap();
        assert_eq!(
            out,
            Value::List(vec![
                Value::Str("1".into()),
                Value::Str("22".into()),
                Value::Str("333".into()),
            ])
        );
    }

    #[test]
    fn test_no_match_is_null() {
        let out = extract(&[
            Value::Str("\\d+".into()),
            Value::Str("no digits here".into()),
        ])
        .unwrap();
        assert_eq!(out, Value::Null);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = extract(&[Value::Str("(unclosed".into()), Value::Str("text".into())])
            .unwrap_err();
        assert!(err.to_string().contains("Invalid pattern"));
    }

    #[test]
    fn test_out_of_range_group_is_reported() {
        let err = extract(&[
            Value::Str("(\\d+)".into()),
            Value::Str("42".into()),
            Value::Bool(false),
            Value::Int(5),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("no capture group 5"));
    }

    #[test]
    fn test_oversized_pattern_rejected() {
        let long = "a".repeat(MAX_REGEX_LENGTH + 1);
        let err = extract(&[Value::Str(long), Value::Str("text".into())]).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }
}
