//! Amount normalization and the four arithmetic commands.

use std::ops::RangeInclusive;

use crate::command::{Command, CommandError};
use crate::metadata::{CommandMetadata, CommandParameter, DataType};
use tally_core::Value;

/// Numeric view used by the arithmetic commands: integers, floats,
/// booleans (1/0), and numeric strings all coerce; anything else does not.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Convert a raw amount string to a float.
///
/// Handles currency symbols (any non-numeric character is stripped),
/// thousands separators, explicit signs, and the accounting convention of
/// wrapping negatives in parentheses - with or without a currency symbol
/// before the opening parenthesis (`(100.00)`, `$(100.00)`).
///
/// Returns `None` for empty or unparseable input.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let mut cleaned = raw.trim().to_string();
    if cleaned.is_empty() {
        return None;
    }

    let mut negative = false;

    // Parenthesized amounts are negative. The prefix before '(' may only
    // be a currency marker - once a digit or sign shows up before the
    // parenthesis this is not the accounting form.
    if cleaned.ends_with(')') {
        if let Some(open) = cleaned.find('(') {
            let prefix = &cleaned[..open];
            if prefix
                .chars()
                .all(|c| !c.is_ascii_digit() && c != '-' && c != '+')
            {
                negative = true;
                cleaned = cleaned[open + 1..cleaned.len() - 1].trim().to_string();
            }
        }
    }

    // Keep digits, decimal points, commas, and signs; everything else
    // (currency symbols, spaces, letters) goes.
    let mut stripped: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .collect();

    if let Some(rest) = stripped.strip_prefix('-') {
        negative = true;
        stripped = rest.to_string();
    } else if let Some(rest) = stripped.strip_prefix('+') {
        stripped = rest.to_string();
    }

    let stripped = stripped.replace(',', "");
    if stripped.is_empty() || stripped == "." {
        return None;
    }

    let parsed: f64 = stripped.parse().ok()?;
    Some(if negative { -parsed } else { parsed })
}

/// `amount_to_float(value)` - normalize an amount to a float.
pub struct AmountToFloat;

impl Command for AmountToFloat {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "amount_to_float".into(),
            description: "Convert amount string to float, handling currency symbols and formatting"
                .into(),
            category: "numeric".into(),
            parameters: vec![CommandParameter::required(
                "amount_string",
                DataType::Any,
                "Amount string to convert (can be string or numeric)",
            )],
            return_type: DataType::Float,
            examples: vec![
                "amount_to_float('$123.45')".into(),
                "amount_to_float('1,234.56')".into(),
                "amount_to_float('-$50.00')".into(),
                "amount_to_float('(100.00)')".into(),
                "amount_to_float('$(243)')".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        let out = match &args[0] {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => parse_amount(s),
            _ => None,
        };
        Ok(out.map(Value::Float).unwrap_or(Value::Null))
    }
}

/// `add(left, right)`
pub struct Add;

impl Command for Add {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "add".into(),
            description: "Add two numeric values".into(),
            category: "math".into(),
            parameters: vec![
                CommandParameter::required("left", DataType::Float, "Left operand"),
                CommandParameter::required("right", DataType::Float, "Right operand"),
            ],
            return_type: DataType::Float,
            examples: vec![
                "add(10.5, 20.3)".into(),
                "add(amount_to_float(money_in), amount_to_float(fee))".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(binary_op(&args[0], &args[1], |a, b| a + b))
    }
}

/// `subtract(left, right)`
pub struct Subtract;

impl Command for Subtract {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "subtract".into(),
            description: "Subtract second value from first value".into(),
            category: "math".into(),
            parameters: vec![
                CommandParameter::required("left", DataType::Float, "Value to subtract from"),
                CommandParameter::required("right", DataType::Float, "Value to subtract"),
            ],
            return_type: DataType::Float,
            examples: vec![
                "subtract(100.0, 25.5)".into(),
                "subtract(amount_to_float(money_in), amount_to_float(money_out))".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(binary_op(&args[0], &args[1], |a, b| a - b))
    }
}

/// `multiply(left, right)`
pub struct Multiply;

impl Command for Multiply {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "multiply".into(),
            description: "Multiply two numeric values".into(),
            category: "math".into(),
            parameters: vec![
                CommandParameter::required("left", DataType::Float, "First value"),
                CommandParameter::required("right", DataType::Float, "Second value"),
            ],
            return_type: DataType::Float,
            examples: vec![
                "multiply(10.0, 1.5)".into(),
                "multiply(amount_to_float(base), 0.1)".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        Ok(binary_op(&args[0], &args[1], |a, b| a * b))
    }
}

/// `divide(dividend, divisor)` - declared failure on a zero divisor.
pub struct Divide;

impl Command for Divide {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata {
            name: "divide".into(),
            description: "Divide first value by second value".into(),
            category: "math".into(),
            parameters: vec![
                CommandParameter::required("dividend", DataType::Float, "Value to be divided"),
                CommandParameter::required("divisor", DataType::Float, "Value to divide by"),
            ],
            return_type: DataType::Float,
            examples: vec![
                "divide(100.0, 4.0)".into(),
                "divide(amount_to_float(total), 12)".into(),
            ],
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError> {
        if args[0].is_null() || args[1].is_null() {
            return Ok(Value::Null);
        }
        let dividend = coerce_f64(&args[0]).ok_or(CommandError::NotConvertible {
            type_name: args[0].type_name(),
            expected: "float",
        })?;
        let divisor = coerce_f64(&args[1]).ok_or(CommandError::NotConvertible {
            type_name: args[1].type_name(),
            expected: "float",
        })?;
        if divisor == 0.0 {
            return Err(CommandError::DivisionByZero);
        }
        Ok(Value::Float(dividend / divisor))
    }
}

/// Shared body for `add`/`subtract`/`multiply`: a null or non-coercible
/// operand propagates null rather than failing - it is never coerced to 0.
fn binary_op(left: &Value, right: &Value, op: impl Fn(f64, f64) -> f64) -> Value {
    match (coerce_f64(left), coerce_f64(right)) {
        (Some(a), Some(b)) => Value::Float(op(a, b)),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn amount(raw: &str) -> Value {
        AmountToFloat.invoke(&[Value::Str(raw.into())]).unwrap()
    }

    #[test]
    fn test_amount_plain_and_currency() {
        assert_eq!(amount("123.45"), Value::Float(123.45));
        assert_eq!(amount("$123.45"), Value::Float(123.45));
        assert_eq!(amount("¥1200"), Value::Float(1200.0));
        assert_eq!(amount("1,234.56"), Value::Float(1234.56));
        assert_eq!(amount("  £ 99 "), Value::Float(99.0));
    }

    #[test]
    fn test_amount_signs() {
        assert_eq!(amount("-$50.00"), Value::Float(-50.0));
        assert_eq!(amount("+50.00"), Value::Float(50.0));
    }

    #[test]
    fn test_amount_parentheses_negative() {
        assert_eq!(amount("(100.00)"), Value::Float(-100.0));
        assert_eq!(amount("$(243)"), Value::Float(-243.0));
        assert_eq!(amount("($243)"), Value::Float(-243.0));
        assert_eq!(amount("R$(1,000.50)"), Value::Float(-1000.5));
    }

    #[test]
    fn test_amount_unparseable_is_null() {
        assert_eq!(amount(""), Value::Null);
        assert_eq!(amount("   "), Value::Null);
        assert_eq!(amount("abc"), Value::Null);
        assert_eq!(amount("."), Value::Null);
        assert_eq!(
            AmountToFloat.invoke(&[Value::Null]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_amount_numeric_passthrough() {
        assert_eq!(
            AmountToFloat.invoke(&[Value::Int(7)]).unwrap(),
            Value::Float(7.0)
        );
        assert_eq!(
            AmountToFloat.invoke(&[Value::Float(7.25)]).unwrap(),
            Value::Float(7.25)
        );
    }

    #[test]
    fn test_arithmetic_null_propagates() {
        assert_eq!(
            Add.invoke(&[Value::Null, Value::Float(1.0)]).unwrap(),
            Value::Null
        );
        assert_eq!(
            Multiply.invoke(&[Value::Float(2.0), Value::Null]).unwrap(),
            Value::Null
        );
        assert_eq!(
            Divide.invoke(&[Value::Null, Value::Float(2.0)]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_arithmetic_numeric_strings_coerce() {
        assert_eq!(
            Add.invoke(&[Value::Str("5".into()), Value::Int(1)]).unwrap(),
            Value::Float(6.0)
        );
        assert_eq!(
            Subtract
                .invoke(&[Value::Float(10.0), Value::Str("2.5".into())])
                .unwrap(),
            Value::Float(7.5)
        );
    }

    #[test]
    fn test_divide_by_zero_is_declared_failure() {
        let err = Divide
            .invoke(&[Value::Float(10.0), Value::Float(0.0)])
            .unwrap_err();
        assert!(err.to_string().contains("Division by zero"));

        let err = Divide
            .invoke(&[Value::Float(10.0), Value::Int(0)])
            .unwrap_err();
        assert!(err.to_string().contains("Division by zero"));
    }

    proptest! {
        /// amount_to_float is idempotent on its own output.
        #[test]
        fn prop_amount_idempotent(x in -1_000_000.0f64..1_000_000.0) {
            let once = AmountToFloat.invoke(&[Value::Str(format!("{x:.2}"))]).unwrap();
            let twice = AmountToFloat.invoke(&[once.clone()]).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// divide(a, 0) fails with "Division by zero" for any dividend.
        #[test]
        fn prop_divide_by_zero_always_fails(a in proptest::num::f64::NORMAL) {
            let err = Divide.invoke(&[Value::Float(a), Value::Int(0)]).unwrap_err();
            prop_assert!(err.to_string().contains("Division by zero"));
        }
    }
}
