//! Tree-walking evaluator over the closed expression enum.

use std::collections::HashMap;

use crate::ast::{BinOp, BoolOp, CmpOp, Expr};
use crate::parser::parse;
use crate::{EvalError, Result};
use tally_commands::CommandRegistry;
use tally_core::{RuleKind, Value};

/// Evaluates formulas against one record and the command catalog.
///
/// Holds only borrows; construct one per record (or per rule) and drop it.
/// Nothing here performs I/O - variable lookups read the record map, and
/// function calls dispatch to the registry.
pub struct Evaluator<'a> {
    record: &'a HashMap<String, Value>,
    registry: &'a CommandRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(record: &'a HashMap<String, Value>, registry: &'a CommandRegistry) -> Self {
        Self { record, registry }
    }

    /// Evaluate a rule condition.
    ///
    /// An empty or blank condition always matches - that is how
    /// "always apply" rules opt out of having one. Every failure comes
    /// back as `(false, Some(message))`, never a panic.
    pub fn evaluate_condition(&self, condition: &str) -> (bool, Option<String>) {
        if condition.trim().is_empty() {
            return (true, None);
        }

        match self.evaluate_expression(condition) {
            Ok(value) => (value.truthy(), None),
            Err(e) => (false, Some(format!("Condition evaluation error: {e}"))),
        }
    }

    /// Evaluate a rule action, dispatched by rule kind.
    pub fn evaluate_action(&self, action: &str, kind: RuleKind) -> (Value, Option<String>) {
        match kind {
            RuleKind::ValueAssignment => (parse_literal(action), None),
            RuleKind::ModelMapping => (Value::Str(action.trim().to_string()), None),
            RuleKind::Formula => match self.evaluate_expression(action) {
                Ok(value) => (value, None),
                Err(e) => (Value::Null, Some(format!("Formula evaluation error: {e}"))),
            },
        }
    }

    /// Parse and evaluate a full formula expression.
    pub fn evaluate_expression(&self, text: &str) -> Result<Value> {
        let expr = parse(text)?;
        self.walk(&expr)
    }

    fn walk(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),

            Expr::Variable(name) => self
                .record
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),

            Expr::Compare { first, rest } => {
                let mut left = self.walk(first)?;
                for (op, right_expr) in rest {
                    let right = self.walk(right_expr)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }

            Expr::BoolChain { op, operands } => {
                // `and`/`or` collapse to a boolean over the operands'
                // truthiness (all/any), so `money_in or 0` is `false`
                // when both operands are falsy, not `0`. Short-circuiting
                // is safe because every sub-expression is pure.
                for operand in operands {
                    let value = self.walk(operand)?;
                    match op {
                        BoolOp::And if !value.truthy() => return Ok(Value::Bool(false)),
                        BoolOp::Or if value.truthy() => return Ok(Value::Bool(true)),
                        _ => {}
                    }
                }
                Ok(Value::Bool(matches!(op, BoolOp::And)))
            }

            Expr::Not(inner) => {
                let value = self.walk(inner)?;
                Ok(Value::Bool(!value.truthy()))
            }

            Expr::Neg(inner) => match self.walk(inner)? {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(EvalError::BadUnaryOperand(other.type_name())),
            },

            Expr::Binary { op, left, right } => {
                let left = self.walk(left)?;
                let right = self.walk(right)?;
                binary(*op, &left, &right)
            }

            Expr::Call { name, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.walk(arg)?);
                }

                if !self.registry.contains(name) {
                    return Err(EvalError::UnknownFunction(name.clone()));
                }
                let result = self.registry.execute(name, &evaluated);
                if result.success {
                    Ok(result.value.unwrap_or(Value::Null))
                } else {
                    Err(EvalError::Command(
                        result.error.unwrap_or_else(|| "unknown error".into()),
                    ))
                }
            }

            Expr::Method { target, name, args } => {
                let target = self.walk(target)?;
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.walk(arg)?);
                }
                method_call(&target, name, &evaluated)
            }
        }
    }
}

/// Parse a value-assignment action as a single literal; anything that is
/// not a literal is kept as the trimmed source text verbatim.
fn parse_literal(text: &str) -> Value {
    match parse(text) {
        Ok(expr) => expr
            .as_literal()
            .unwrap_or_else(|| Value::Str(text.trim().to_string())),
        Err(_) => Value::Str(text.trim().to_string()),
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool> {
    match op {
        CmpOp::Eq => Ok(left.loose_eq(right)),
        CmpOp::Ne => Ok(!left.loose_eq(right)),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let ordering = ordering(op, left, right)?;
            Ok(match op {
                CmpOp::Lt => ordering.is_lt(),
                CmpOp::Le => ordering.is_le(),
                CmpOp::Gt => ordering.is_gt(),
                CmpOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            })
        }
        CmpOp::In => membership(left, right),
        CmpOp::NotIn => membership(left, right).map(|contained| !contained),
    }
}

fn ordering(op: CmpOp, left: &Value, right: &Value) -> Result<std::cmp::Ordering> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a
            .partial_cmp(&b)
            .ok_or(EvalError::BadOperands {
                op: op.symbol(),
                left: left.type_name(),
                right: right.type_name(),
            });
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
        _ => Err(EvalError::BadOperands {
            op: op.symbol(),
            left: left.type_name(),
            right: right.type_name(),
        }),
    }
}

fn membership(needle: &Value, haystack: &Value) -> Result<bool> {
    match haystack {
        Value::List(items) => Ok(items.iter().any(|item| item.loose_eq(needle))),
        Value::Str(text) => Ok(text.contains(&needle.to_text())),
        _ => Err(EvalError::BadOperands {
            op: "in",
            left: needle.type_name(),
            right: haystack.type_name(),
        }),
    }
}

fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value> {
    let bad = || EvalError::BadOperands {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };

    // String concatenation is the one non-numeric arithmetic form.
    if op == BinOp::Add {
        if let (Value::Str(a), Value::Str(b)) = (left, right) {
            return Ok(Value::Str(format!("{a}{b}")));
        }
    }

    let a = left.as_f64().ok_or_else(bad)?;
    let b = right.as_f64().ok_or_else(bad)?;

    let out = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a % b
        }
    };
    Ok(Value::Float(out))
}

/// The fixed whitelist of string methods, implemented here rather than
/// forwarded anywhere. The predicate forms are case-insensitive.
fn method_call(target: &Value, name: &str, args: &[Value]) -> Result<Value> {
    let expect_args = |expected: usize| -> Result<()> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(EvalError::MethodArity {
                method: name.to_string(),
                expected,
            })
        }
    };

    let text = target.to_text();
    match name {
        "contains" => {
            expect_args(1)?;
            let needle = args[0].to_text().to_lowercase();
            Ok(Value::Bool(text.to_lowercase().contains(&needle)))
        }
        "startswith" => {
            expect_args(1)?;
            let prefix = args[0].to_text().to_lowercase();
            Ok(Value::Bool(text.to_lowercase().starts_with(&prefix)))
        }
        "endswith" => {
            expect_args(1)?;
            let suffix = args[0].to_text().to_lowercase();
            Ok(Value::Bool(text.to_lowercase().ends_with(&suffix)))
        }
        "lower" => {
            expect_args(0)?;
            Ok(Value::Str(text.to_lowercase()))
        }
        "upper" => {
            expect_args(0)?;
            Ok(Value::Str(text.to_uppercase()))
        }
        "strip" => {
            expect_args(0)?;
            Ok(Value::Str(text.trim().to_string()))
        }
        other => Err(EvalError::UnknownMethod(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> HashMap<String, Value> {
        HashMap::from([
            ("merchant".to_string(), Value::Str("Amazon Web Services".into())),
            ("amount".to_string(), Value::Str("100.50".into())),
            ("amount_computed".to_string(), Value::Float(100.5)),
            ("money_in".to_string(), Value::Null),
            ("count".to_string(), Value::Int(3)),
        ])
    }

    fn eval(text: &str) -> Result<Value> {
        let record = record();
        let registry = CommandRegistry::with_builtins();
        Evaluator::new(&record, &registry).evaluate_expression(text)
    }

    fn condition(text: &str) -> (bool, Option<String>) {
        let record = record();
        let registry = CommandRegistry::with_builtins();
        Evaluator::new(&record, &registry).evaluate_condition(text)
    }

    #[test]
    fn test_empty_condition_always_matches() {
        assert_eq!(condition(""), (true, None));
        assert_eq!(condition("   "), (true, None));
    }

    #[test]
    fn test_condition_truthiness_of_field() {
        assert_eq!(condition("merchant"), (true, None));
        let (matched, error) = condition("money_in");
        assert!(!matched);
        assert!(error.is_none());
    }

    #[test]
    fn test_unknown_variable_is_declared_error() {
        let (matched, error) = condition("no_such_field");
        assert!(!matched);
        assert!(error.unwrap().contains("Unknown variable: no_such_field"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("amount_computed > 100").unwrap(), Value::Bool(true));
        assert_eq!(eval("amount_computed <= 100").unwrap(), Value::Bool(false));
        assert_eq!(eval("count == 3").unwrap(), Value::Bool(true));
        assert_eq!(eval("count != 3").unwrap(), Value::Bool(false));
        assert_eq!(eval("money_in == None").unwrap(), Value::Bool(true));
        assert_eq!(eval("1 < count < 5").unwrap(), Value::Bool(true));
        assert_eq!(eval("1 < count < 3").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_mixed_type_ordering_is_error() {
        let err = eval("merchant > 5").unwrap_err();
        assert!(err.to_string().contains("Unsupported operand types"));
    }

    #[test]
    fn test_boolean_composition_collapses_to_bool() {
        // A null-guard over two falsy operands is `false`, not the last
        // operand.
        assert_eq!(eval("money_in or 0").unwrap(), Value::Bool(false));
        assert_eq!(eval("money_in or count").unwrap(), Value::Bool(true));
        assert_eq!(eval("count and merchant").unwrap(), Value::Bool(true));
        assert_eq!(eval("count and money_in").unwrap(), Value::Bool(false));
        assert_eq!(eval("not money_in").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("amount_computed * 100").unwrap(), Value::Float(10050.0));
        assert_eq!(eval("count + 1").unwrap(), Value::Float(4.0));
        assert_eq!(eval("7 % 4").unwrap(), Value::Float(3.0));
        assert_eq!(eval("'a' + 'b'").unwrap(), Value::Str("ab".into()));
    }

    #[test]
    fn test_division_by_zero_is_declared_error() {
        let err = eval("count / 0").unwrap_err();
        assert!(err.to_string().contains("Division by zero"));
    }

    #[test]
    fn test_null_arithmetic_is_error() {
        let err = eval("money_in + 1").unwrap_err();
        assert!(err.to_string().contains("Unsupported operand types"));
    }

    #[test]
    fn test_nested_command_calls() {
        assert_eq!(
            eval("multiply(add(amount_to_float(amount), 5.0), 2.0)").unwrap(),
            Value::Float(211.0)
        );
    }

    #[test]
    fn test_command_failure_propagates_as_error() {
        let err = eval("divide(count, 0)").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Formula command error"));
        assert!(message.contains("Division by zero"));
    }

    #[test]
    fn test_unknown_function_is_error() {
        let err = eval("open_file('x')").unwrap_err();
        assert!(err.to_string().contains("Function not supported: open_file"));
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(eval("merchant.contains('amazon')").unwrap(), Value::Bool(true));
        assert_eq!(eval("merchant.startswith('AMA')").unwrap(), Value::Bool(true));
        assert_eq!(eval("merchant.endswith('services')").unwrap(), Value::Bool(true));
        assert_eq!(eval("merchant.lower()").unwrap(), Value::Str("amazon web services".into()));
        assert_eq!(eval("'  x '.strip()").unwrap(), Value::Str("x".into()));
    }

    #[test]
    fn test_unsupported_method_is_error() {
        let err = eval("merchant.replace('a', 'b')").unwrap_err();
        assert!(err.to_string().contains("Unsupported method: replace"));
    }

    #[test]
    fn test_membership() {
        assert_eq!(eval("'Amazon' in merchant").unwrap(), Value::Bool(true));
        assert_eq!(eval("'ebay' not in merchant").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_action_kinds() {
        let record = record();
        let registry = CommandRegistry::with_builtins();
        let evaluator = Evaluator::new(&record, &registry);

        // Literal assignment, including the quirky non-literal fallback.
        assert_eq!(
            evaluator.evaluate_action("42", RuleKind::ValueAssignment),
            (Value::Int(42), None)
        );
        assert_eq!(
            evaluator.evaluate_action("'Cash'", RuleKind::ValueAssignment),
            (Value::Str("Cash".into()), None)
        );
        assert_eq!(
            evaluator.evaluate_action("True", RuleKind::ValueAssignment),
            (Value::Bool(true), None)
        );
        assert_eq!(
            evaluator.evaluate_action("  Groceries ", RuleKind::ValueAssignment),
            (Value::Str("Groceries".into()), None)
        );
        assert_eq!(
            evaluator.evaluate_action("-2.5", RuleKind::ValueAssignment),
            (Value::Float(-2.5), None)
        );

        // Model mappings come back as trimmed source text.
        assert_eq!(
            evaluator.evaluate_action(" Account('Cash') ", RuleKind::ModelMapping),
            (Value::Str("Account('Cash')".into()), None)
        );

        // Formula failures surface with the formula prefix.
        let (value, error) = evaluator.evaluate_action("bogus_fn(1)", RuleKind::Formula);
        assert_eq!(value, Value::Null);
        assert!(error.unwrap().starts_with("Formula evaluation error:"));

        // A boolean-chain formula stores a boolean, even when its last
        // operand is a non-boolean fallback value.
        assert_eq!(
            evaluator.evaluate_action("money_in or 0", RuleKind::Formula),
            (Value::Bool(false), None)
        );
    }

    #[test]
    fn test_date_ordering() {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap()
        };
        let mut record = record();
        record.insert("posting_date".to_string(), Value::Date(day(15)));
        record.insert("completed_date".to_string(), Value::Date(day(20)));
        let registry = CommandRegistry::with_builtins();
        let evaluator = Evaluator::new(&record, &registry);

        assert_eq!(
            evaluator.evaluate_expression("posting_date < completed_date").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            evaluator.evaluate_expression("posting_date >= completed_date").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            evaluator.evaluate_expression("posting_date == posting_date").unwrap(),
            Value::Bool(true)
        );
    }
}
