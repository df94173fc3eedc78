//! The `Command` trait and command-level error type.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::metadata::CommandMetadata;
use tally_core::Value;

/// Errors a command body can report.
///
/// These never escape [`crate::CommandRegistry::execute`]; the registry
/// renders them into a `CommandResult`.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Fewer arguments than the command's required parameter count.
    #[error("Missing required parameters: {0:?}")]
    MissingParameters(Vec<String>),

    /// More arguments than the command accepts.
    #[error("Command '{command}' accepts at most {max} arguments, got {got}")]
    TooManyArguments {
        command: String,
        max: usize,
        got: usize,
    },

    /// Division or modulo with a zero divisor.
    #[error("Division by zero")]
    DivisionByZero,

    /// A user-supplied regex pattern failed to compile or exceeded limits.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// An argument had a shape the command cannot work with.
    #[error("Cannot convert {type_name} value to {expected}")]
    NotConvertible {
        type_name: &'static str,
        expected: &'static str,
    },
}

/// A named, pure, introspectable operation callable from formulas.
///
/// Implementations are stateless unit structs; the registry owns one boxed
/// instance of each. `invoke` takes already-evaluated positional arguments
/// and must return all failure as `Err` - panicking is a bug.
pub trait Command: Send + Sync {
    /// Self-describing metadata (name, parameters, examples).
    fn metadata(&self) -> CommandMetadata;

    /// Accepted positional-argument counts.
    ///
    /// The lower bound is the required parameter count, the upper bound
    /// the total parameter count. Declared here, in the implementation,
    /// so the registry's structural self-check can compare it against the
    /// metadata without reflection.
    fn arity(&self) -> RangeInclusive<usize>;

    /// Execute the command body against evaluated arguments.
    fn invoke(&self, args: &[Value]) -> Result<Value, CommandError>;
}
