//! Tally Rule Engine - applies prioritized computed-field rules to records.
//!
//! Given an ordered rule set and one record, the engine evaluates each
//! rule's condition against the current working state, runs the action of
//! matching rules, and merges the computed values into the output. Two
//! authoring patterns fall out of the same mechanism, with no
//! special-casing for either:
//!
//! - **Fallback**: several rules target one field with mutually exclusive
//!   conditions, so exactly one contributes a value.
//! - **Chaining**: a later rule's condition or action reads a value an
//!   earlier rule wrote in the same pass and refines it further.
//!
//! Rule failures never abort sibling rules, and batch processing isolates
//! faults per record. All failure is data ([`RuleEvaluationResult`],
//! [`RecordOutcome`]); nothing here panics on user-authored input.

pub mod batch;
pub mod context;
pub mod engine;
pub mod rule;

pub use batch::{BatchOptions, BatchRecord, RecordOutcome};
pub use context::ExecutionContext;
pub use engine::RuleEngine;
pub use rule::{Rule, RuleEvaluationResult};

// Rule kinds live in tally-core so the evaluator can dispatch on them.
pub use tally_core::RuleKind;
