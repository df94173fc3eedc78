//! Rule kind tags shared by the evaluator and the rule engine.

use serde::{Deserialize, Serialize};

/// How a rule's action expression is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Action is a full formula expression (commands, operators, fields).
    Formula,
    /// Action names a domain object mapping like `Account('Cash')`;
    /// returned as its trimmed source text.
    ModelMapping,
    /// Action is a single literal assigned verbatim.
    ValueAssignment,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Formula => "formula",
            RuleKind::ModelMapping => "model_mapping",
            RuleKind::ValueAssignment => "value_assignment",
        }
    }
}
