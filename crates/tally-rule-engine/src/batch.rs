//! Fault-isolated rule execution across many records.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tally_core::Value;
use tracing::warn;

use crate::engine::RuleEngine;
use crate::rule::Rule;

/// One record's inputs for a batch pass.
#[derive(Debug, Clone)]
pub struct BatchRecord {
    pub id: String,
    pub ingested_fields: HashMap<String, Value>,
    pub computed_fields: HashMap<String, Value>,
}

/// Narrowing applied to the rule set before a batch pass.
///
/// `None` means "no filter"; an empty list matches nothing.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Only run rules writing one of these fields.
    pub target_fields: Option<Vec<String>>,
    /// Only run rules with one of these ids.
    pub rule_ids: Option<Vec<String>>,
}

impl BatchOptions {
    fn accepts(&self, rule: &Rule) -> bool {
        if let Some(fields) = &self.target_fields {
            if !fields.iter().any(|f| f == &rule.target_field) {
                return false;
            }
        }
        if let Some(ids) = &self.rule_ids {
            if !ids.iter().any(|id| id == &rule.id) {
                return false;
            }
        }
        true
    }
}

/// Result of processing one record in a batch.
///
/// `error` is set only when the record's whole pass was lost, not when
/// individual rules inside the pass failed (those are logged and skipped
/// by the engine).
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub record_id: String,
    pub computed: HashMap<String, Value>,
    pub error: Option<String>,
}

impl RecordOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl RuleEngine {
    /// Run a rule set across many records with per-record fault isolation.
    ///
    /// A failure in one record's pass is logged against that record's id
    /// and recorded in its outcome; the batch always continues to the end
    /// and returns one outcome per input record, in input order.
    pub fn execute_batch(
        &self,
        rules: &[Rule],
        records: &[BatchRecord],
        options: &BatchOptions,
    ) -> Vec<RecordOutcome> {
        let selected: Vec<Rule> = rules
            .iter()
            .filter(|r| options.accepts(r))
            .cloned()
            .collect();

        records
            .iter()
            .map(|record| {
                let pass = catch_unwind(AssertUnwindSafe(|| {
                    self.execute(&selected, &record.ingested_fields, &record.computed_fields)
                }));
                match pass {
                    Ok(computed) => RecordOutcome {
                        record_id: record.id.clone(),
                        computed,
                        error: None,
                    },
                    Err(panic) => {
                        let message = panic_message(&panic);
                        warn!(record_id = %record.id, error = %message, "record pass failed");
                        RecordOutcome {
                            record_id: record.id.clone(),
                            computed: HashMap::new(),
                            error: Some(message),
                        }
                    }
                }
            })
            .collect()
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule execution panicked".to_string()
    }
}
