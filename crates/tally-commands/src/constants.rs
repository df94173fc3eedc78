//! Limits applied to user-supplied regex patterns.
//!
//! The `regex` formula command compiles patterns authored by rule editors,
//! so compilation goes through defensive limits to keep a pathological
//! pattern from consuming excessive memory or CPU.

/// Maximum regex pattern length (500 characters)
pub const MAX_REGEX_LENGTH: usize = 500;

/// Compiled regex size limit (10MB)
pub const REGEX_SIZE_LIMIT: usize = 10_000_000;

/// Regex DFA size limit (2MB)
pub const REGEX_DFA_SIZE_LIMIT: usize = 2_000_000;
