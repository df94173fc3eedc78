//! Rule execution against a single record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tally_commands::CommandRegistry;
use tally_core::Value;
use tally_eval::Evaluator;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::rule::{sort_for_evaluation, Rule, RuleEvaluationResult};

/// Applies prioritized rules to records using the shared command catalog.
///
/// The engine is stateless between calls; cloning it clones an `Arc`, so
/// one registry instance backs every concurrent execution.
#[derive(Clone)]
pub struct RuleEngine {
    registry: Arc<CommandRegistry>,
}

impl RuleEngine {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Build an engine over the built-in command catalog.
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(CommandRegistry::with_builtins()))
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Evaluate one rule against the current working state.
    ///
    /// Never returns an `Err` and never panics on user-authored rules;
    /// every failure mode is carried in the result so callers (and
    /// rule-testing UIs) can distinguish inactive, not-matched, and
    /// matched-but-failed.
    pub fn evaluate_rule(&self, rule: &Rule, context: &ExecutionContext) -> RuleEvaluationResult {
        if !rule.active {
            return RuleEvaluationResult {
                success: false,
                condition_matched: false,
                target_field: rule.target_field.clone(),
                computed_value: None,
                error: Some("Rule is not active".to_string()),
            };
        }

        let evaluator = Evaluator::new(context.fields(), &self.registry);

        let condition = rule.condition.as_deref().unwrap_or("");
        let (matched, condition_error) = evaluator.evaluate_condition(condition);
        if let Some(message) = condition_error {
            return RuleEvaluationResult {
                success: false,
                condition_matched: false,
                target_field: rule.target_field.clone(),
                computed_value: None,
                error: Some(format!("Condition error: {message}")),
            };
        }
        if !matched {
            return RuleEvaluationResult {
                success: true,
                condition_matched: false,
                target_field: rule.target_field.clone(),
                computed_value: None,
                error: None,
            };
        }

        let (value, action_error) = evaluator.evaluate_action(&rule.action, rule.kind);
        if let Some(message) = action_error {
            return RuleEvaluationResult {
                success: false,
                condition_matched: true,
                target_field: rule.target_field.clone(),
                computed_value: None,
                error: Some(format!("Action error: {message}")),
            };
        }

        RuleEvaluationResult {
            success: true,
            condition_matched: true,
            target_field: rule.target_field.clone(),
            computed_value: Some(value),
            error: None,
        }
    }

    /// Run a rule set against one record and return the computed fields.
    ///
    /// Rules run in priority order (ties broken by creation time) against
    /// a working context that absorbs each successful result, so later
    /// rules can chain on earlier outputs. Each rule id executes at most
    /// once per pass. A failing rule is logged and skipped; it never
    /// aborts its siblings.
    pub fn execute(
        &self,
        rules: &[Rule],
        ingested_fields: &HashMap<String, Value>,
        computed_fields: &HashMap<String, Value>,
    ) -> HashMap<String, Value> {
        let mut context =
            ExecutionContext::new(ingested_fields, computed_fields, self.registry.names());
        let mut output: HashMap<String, Value> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for rule in sort_for_evaluation(rules) {
            if !seen.insert(rule.id.as_str()) {
                debug!(rule_id = %rule.id, "skipping duplicate rule in pass");
                continue;
            }

            let result = self.evaluate_rule(rule, &context);
            if let Some(error) = &result.error {
                debug!(rule_id = %rule.id, rule_name = %rule.name, %error, "rule skipped");
                continue;
            }
            if !result.condition_matched {
                continue;
            }
            if let Some(value) = result.computed_value {
                context.insert(rule.target_field.clone(), value.clone());
                output.insert(rule.target_field.clone(), value);
            }
        }

        output
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tally_core::RuleKind;

    fn make_rule(id: &str, target: &str, condition: Option<&str>, action: &str) -> Rule {
        Rule {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            target_field: target.to_string(),
            condition: condition.map(str::to_string),
            action: action.to_string(),
            kind: RuleKind::Formula,
            priority: 1,
            active: true,
            created_at: Utc.timestamp_opt(0, 0).unwrap(),
            updated_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    fn record(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_inactive_rule_reports_distinct_error() {
        let engine = RuleEngine::with_builtins();
        let mut rule = make_rule("r1", "out", None, "1 + 1");
        rule.active = false;

        let ctx = ExecutionContext::default();
        let result = engine.evaluate_rule(&rule, &ctx);
        assert!(!result.success);
        assert!(!result.condition_matched);
        assert_eq!(result.error.as_deref(), Some("Rule is not active"));
    }

    #[test]
    fn test_condition_not_matched_is_success_without_value() {
        let engine = RuleEngine::with_builtins();
        let rule = make_rule("r1", "out", Some("amount > 100"), "amount");

        let mut ctx = ExecutionContext::default();
        ctx.insert("amount", Value::Int(50));
        let result = engine.evaluate_rule(&rule, &ctx);
        assert!(result.success);
        assert!(!result.condition_matched);
        assert!(result.computed_value.is_none());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_condition_error_prefixes_message() {
        let engine = RuleEngine::with_builtins();
        let rule = make_rule("r1", "out", Some("nonexistent > 1"), "1");

        let ctx = ExecutionContext::default();
        let result = engine.evaluate_rule(&rule, &ctx);
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("Condition error: "), "{error}");
        assert!(error.contains("Unknown variable: nonexistent"), "{error}");
    }

    #[test]
    fn test_action_error_prefixes_message() {
        let engine = RuleEngine::with_builtins();
        let rule = make_rule("r1", "out", None, "1 / 0");

        let ctx = ExecutionContext::default();
        let result = engine.evaluate_rule(&rule, &ctx);
        assert!(!result.success);
        assert!(result.condition_matched);
        let error = result.error.unwrap();
        assert!(error.starts_with("Action error: "), "{error}");
        assert!(error.contains("Division by zero"), "{error}");
    }

    #[test]
    fn test_execute_failing_rule_does_not_abort_siblings() {
        let engine = RuleEngine::with_builtins();
        let mut broken = make_rule("broken", "a", None, "1 / 0");
        broken.priority = 1;
        let mut fine = make_rule("fine", "b", None, "2 + 3");
        fine.priority = 2;

        let computed = engine.execute(&[broken, fine], &record(&[]), &HashMap::new());
        assert_eq!(computed.get("b"), Some(&Value::Float(5.0)));
        assert!(!computed.contains_key("a"));
    }

    #[test]
    fn test_execute_dedups_by_rule_id() {
        let engine = RuleEngine::with_builtins();
        // Two copies of the same rule id must execute once even with
        // different actions, otherwise chained doubling runs twice.
        let mut first = make_rule("dup", "out", None, "amount_to_float(amount) * 2");
        first.priority = 1;
        let mut second = make_rule("dup", "out", None, "out * 3");
        second.priority = 2;

        let ingested = record(&[("amount", Value::Str("$100.50".into()))]);
        let computed = engine.execute(&[first, second], &ingested, &HashMap::new());
        assert_eq!(computed.get("out"), Some(&Value::Float(201.0)));
    }
}
