//! The dynamic value type shared by records, commands, and the evaluator.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single record field or formula result.
///
/// Records arrive as flat string-keyed maps of these values; formula
/// commands and the expression evaluator only ever produce values of this
/// closed set. There is deliberately no object/map variant - the formula
/// language has no way to construct one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    /// Truthiness as the stored formulas expect it: null, `false`, zero,
    /// the empty string, and the empty list are falsey; everything else
    /// (including any date) is truthy.
    ///
    /// Rule conditions like `condition = "posting_date"` rely on this to
    /// mean "the field is present and non-empty".
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Date(_) => true,
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Numeric view for `Int` and `Float`; `None` for everything else.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the string payload if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose equality used by the `==`/`!=` operators: `Int` and `Float`
    /// compare numerically, same-variant values compare structurally, and
    /// any cross-type comparison is simply `false` - never an error.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) => (*a as f64) == *b,
            (Value::Float(a), Value::Int(b)) => *a == (*b as f64),
            (a, b) => a == b,
        }
    }

    /// Render this value as text, for the whitelisted string methods
    /// (`lower`, `contains`, ...) which accept any value and stringify it.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_text).collect();
                parts.join(", ")
            }
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::List(_) => "list",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Bool(false).truthy());
        assert!(!Value::Int(0).truthy());
        assert!(!Value::Float(0.0).truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(!Value::List(vec![]).truthy());

        assert!(Value::Bool(true).truthy());
        assert!(Value::Int(-3).truthy());
        assert!(Value::Float(0.01).truthy());
        assert!(Value::Str("x".into()).truthy());
        assert!(Value::List(vec![Value::Null]).truthy());
    }

    #[test]
    fn test_loose_eq_numeric_cross_type() {
        assert!(Value::Int(5).loose_eq(&Value::Float(5.0)));
        assert!(Value::Float(5.0).loose_eq(&Value::Int(5)));
        assert!(!Value::Int(5).loose_eq(&Value::Str("5".into())));
        assert!(Value::Null.loose_eq(&Value::Null));
        assert!(!Value::Null.loose_eq(&Value::Int(0)));
    }

    #[test]
    fn test_serde_roundtrip_scalars() {
        let v: Value = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(v, Value::Str("hello".into()));
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::Int(42));
        let v: Value = serde_json::from_str("4.5").unwrap();
        assert_eq!(v, Value::Float(4.5));
        let v: Value = serde_json::from_str("null").unwrap();
        assert_eq!(v, Value::Null);
    }
}
