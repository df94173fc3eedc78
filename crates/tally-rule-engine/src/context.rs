//! Working state for one record's execution pass.

use std::collections::{HashMap, HashSet};

use tally_core::Value;

/// Mutable view of a record while its rules run.
///
/// Starts as the union of ingested and previously computed fields, and
/// absorbs each successful rule's output immediately, which is what lets a
/// later rule read a value an earlier rule wrote. Also tracks where each
/// field name came from and which commands the pass may call, for
/// authoring and diagnostic tooling.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    data: HashMap<String, Value>,
    ingested_fields: HashSet<String>,
    computed_fields: HashSet<String>,
    available_commands: Vec<String>,
}

impl ExecutionContext {
    pub fn new(
        ingested_fields: &HashMap<String, Value>,
        computed_fields: &HashMap<String, Value>,
        available_commands: Vec<String>,
    ) -> Self {
        let mut data = ingested_fields.clone();
        data.extend(
            computed_fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self {
            data,
            ingested_fields: ingested_fields.keys().cloned().collect(),
            computed_fields: computed_fields.keys().cloned().collect(),
            available_commands,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Record a computed value so later rules in the same pass can see it.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        self.computed_fields.insert(field.clone());
        self.data.insert(field, value);
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.data
    }

    /// Field names that came in with the record itself.
    pub fn ingested_fields(&self) -> &HashSet<String> {
        &self.ingested_fields
    }

    /// Field names produced by rules, in this pass or a prior one.
    pub fn computed_fields(&self) -> &HashSet<String> {
        &self.computed_fields
    }

    pub fn available_commands(&self) -> &[String] {
        &self.available_commands
    }
}
