//! Tally Eval - sandboxed evaluation of rule formulas.
//!
//! This crate turns formula text into a [`Value`] while only ever touching
//! the record's fields and the command catalog. The grammar is a closed
//! whitelist: literals, field references, comparisons, boolean
//! composition, arithmetic, catalog command calls, and a handful of string
//! methods. Anything outside that set is a declared error - there is no
//! path from a formula to the filesystem, the network, or host-language
//! reflection.
//!
//! # Pipeline
//!
//! ```text
//! formula text ──lexer──▶ tokens ──parser──▶ Expr ──walker──▶ Value
//! ```
//!
//! The [`Expr`] tree is a closed enum with an exhaustive match in the
//! walker, so adding a node kind without a handler is a compile error
//! rather than a runtime "unsupported node" branch.
//!
//! [`Value`]: tally_core::Value
//! [`Expr`]: ast::Expr

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use eval::Evaluator;

use thiserror::Error;

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors surfaced while parsing or evaluating a formula.
///
/// Every variant is a declared, data-carrying failure; none of them abort
/// sibling rule processing.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The formula text could not be tokenized or parsed.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A field reference did not resolve against the record.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// A called function name is not in the command catalog.
    #[error("Function not supported: {0}")]
    UnknownFunction(String),

    /// A method outside the whitelisted string methods.
    #[error("Unsupported method: {0}")]
    UnknownMethod(String),

    /// A whitelisted method called with the wrong argument count.
    #[error("Method '{method}' expects {expected} argument(s)")]
    MethodArity { method: String, expected: usize },

    /// A catalog command reported failure from inside the expression.
    #[error("Formula command error: {0}")]
    Command(String),

    /// Division or modulo with a zero divisor.
    #[error("Division by zero")]
    DivisionByZero,

    /// Unary minus applied to a non-numeric value.
    #[error("Unsupported operand type for unary '-': {0}")]
    BadUnaryOperand(&'static str),

    /// An operator applied to operand types it does not support.
    #[error("Unsupported operand types for '{op}': {left} and {right}")]
    BadOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}
