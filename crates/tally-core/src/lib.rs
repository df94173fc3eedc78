//! Tally Core - Shared value model for the rule evaluation system.
//!
//! This crate provides the foundational [`Value`] type that flows through
//! the whole pipeline: record fields come in as values, formula commands
//! consume and produce values, and the rule engine writes computed values
//! back into the record.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ tally-rule-engine  │  (priority ordering, fallback, chaining)
//! └─────────┬──────────┘
//!           │
//!           ▼
//! ┌────────────────────┐
//! │    tally-eval      │  (sandboxed expression evaluation)
//! └─────────┬──────────┘
//!           │
//!           ▼
//! ┌────────────────────┐
//! │  tally-commands    │  (fixed catalog of formula commands)
//! └─────────┬──────────┘
//!           │
//!           ▼
//! ┌────────────────────┐
//! │    tally-core      │  (this crate - value model)
//! └────────────────────┘
//! ```

pub mod kind;
pub mod value;

pub use kind::RuleKind;
pub use value::Value;
