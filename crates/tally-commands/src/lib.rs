//! Tally Commands - the fixed catalog of formula commands.
//!
//! Formulas in rule conditions and actions can only call named commands
//! from this catalog (plus a small set of whitelisted string methods
//! handled by the evaluator itself). Each command is a pure function over
//! [`Value`]s that describes its own parameters, return type, and usage
//! examples for introspection UIs.
//!
//! # Architecture
//!
//! - **Static catalog**: the built-in set is compile-time known and
//!   registered once at startup via [`CommandRegistry::with_builtins`].
//! - **Failure as data**: [`CommandRegistry::execute`] never panics; every
//!   fault comes back as a [`CommandResult`] with `success = false`.
//! - **Structural self-check**: each command declares its accepted
//!   argument counts through [`Command::arity`], and a unit test verifies
//!   the declared parameter descriptors agree with it for the whole
//!   catalog.
//!
//! [`Value`]: tally_core::Value

pub mod builtins;
pub mod command;
pub mod constants;
pub mod metadata;
pub mod registry;

pub use command::{Command, CommandError};
pub use constants::{MAX_REGEX_LENGTH, REGEX_DFA_SIZE_LIMIT, REGEX_SIZE_LIMIT};
pub use metadata::{CommandMetadata, CommandParameter, CommandResult, DataType};
pub use registry::CommandRegistry;
