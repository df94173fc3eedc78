//! Rule definitions and per-rule evaluation outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::{RuleKind, Value};

/// A stored computed-field rule.
///
/// Rules are created and edited by an administrative surface outside this
/// crate; the engine receives them as an immutable snapshot for one
/// execution pass and never persists them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique id; also the dedup key within one execution pass.
    pub id: String,

    /// Display name (for logging and authoring UIs).
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// The computed field this rule writes.
    pub target_field: String,

    /// Condition expression; absent or empty always matches.
    #[serde(default)]
    pub condition: Option<String>,

    /// Action expression, interpreted according to `kind`.
    pub action: String,

    #[serde(rename = "rule_type")]
    pub kind: RuleKind,

    /// Lower priority evaluates earlier.
    pub priority: i32,

    #[serde(default = "default_active")]
    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Sort rules into evaluation order: priority ascending, then creation
/// time ascending. The sort is stable, so equal-priority rules behave
/// identically across runs.
pub fn sort_for_evaluation(rules: &[Rule]) -> Vec<&Rule> {
    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    ordered
}

/// Outcome of evaluating a single rule against one record.
///
/// The three failure shapes stay distinguishable for rule-testing UIs:
/// inactive (`success=false, condition_matched=false`, "Rule is not
/// active"), condition-did-not-match (`success=true,
/// condition_matched=false`), and matched-but-action-failed
/// (`success=false, condition_matched=true`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEvaluationResult {
    pub success: bool,
    pub condition_matched: bool,
    pub target_field: String,
    #[serde(default)]
    pub computed_value: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rule_at(id: &str, priority: i32, created_secs: i64) -> Rule {
        Rule {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            target_field: "out".into(),
            condition: None,
            action: "1".into(),
            kind: RuleKind::Formula,
            priority,
            active: true,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
            updated_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_sort_by_priority_then_created_at() {
        let rules = vec![
            rule_at("late", 2, 100),
            rule_at("older", 1, 50),
            rule_at("newer", 1, 75),
        ];
        let ordered: Vec<&str> = sort_for_evaluation(&rules)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["older", "newer", "late"]);
    }

    #[test]
    fn test_deserialize_rule_json() {
        let json = r#"{
            "id": "rule-1",
            "name": "Normalize amount",
            "target_field": "amount_computed",
            "condition": "amount",
            "action": "amount_to_float(amount)",
            "rule_type": "formula",
            "priority": 1,
            "active": true,
            "created_at": "2023-01-01T00:00:00Z",
            "updated_at": "2023-01-01T00:00:00Z"
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.kind, RuleKind::Formula);
        assert_eq!(rule.condition.as_deref(), Some("amount"));
    }
}
