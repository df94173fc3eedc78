//! Self-describing command metadata and the command result envelope.
//!
//! These types exist for introspection (listing commands in an authoring
//! UI) and for returning command outcomes as structured data. Parameter
//! data types are documentation, not an enforced type system - commands
//! coerce or reject their inputs internally.

use serde::{Deserialize, Serialize};
use tally_core::Value;

/// Declared data type of a command parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Float,
    Integer,
    Date,
    Boolean,
    Any,
}

/// Description of one command parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandParameter {
    pub name: String,
    pub data_type: DataType,
    pub description: String,
    /// Required parameters must be supplied on every call; optional ones
    /// fall back to `default_value`.
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
}

fn default_required() -> bool {
    true
}

impl CommandParameter {
    /// A required parameter with no default.
    pub fn required(name: &str, data_type: DataType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            description: description.to_string(),
            required: true,
            default_value: None,
        }
    }

    /// An optional parameter with a default value.
    pub fn optional(
        name: &str,
        data_type: DataType,
        description: &str,
        default_value: Value,
    ) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            description: description.to_string(),
            required: false,
            default_value: Some(default_value),
        }
    }
}

/// Metadata describing a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Unique command name, as referenced from formulas.
    pub name: String,
    pub description: String,
    /// Category tag for UI grouping only; carries no semantics.
    pub category: String,
    pub parameters: Vec<CommandParameter>,
    pub return_type: DataType,
    /// Usage examples for documentation. Never executed.
    #[serde(default)]
    pub examples: Vec<String>,
}

impl CommandMetadata {
    /// Names of the required parameters, in declaration order.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Outcome of one command invocation.
///
/// Failure never propagates past the command boundary as a panic or an
/// `Err`; it is always returned as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn ok(value: Value) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_parameters_filters_optional() {
        let meta = CommandMetadata {
            name: "demo".into(),
            description: "demo".into(),
            category: "utility".into(),
            parameters: vec![
                CommandParameter::required("a", DataType::Any, "first"),
                CommandParameter::optional("b", DataType::Boolean, "flag", Value::Bool(true)),
            ],
            return_type: DataType::Any,
            examples: vec![],
        };
        assert_eq!(meta.required_parameters(), vec!["a"]);
    }

    #[test]
    fn test_command_result_constructors() {
        let ok = CommandResult::ok(Value::Int(1));
        assert!(ok.success);
        assert_eq!(ok.value, Some(Value::Int(1)));
        assert!(ok.error.is_none());

        let fail = CommandResult::fail("boom");
        assert!(!fail.success);
        assert!(fail.value.is_none());
        assert_eq!(fail.error.as_deref(), Some("boom"));
    }
}
