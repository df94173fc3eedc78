//! The built-in command set.
//!
//! Commands are grouped by category: `math` and `numeric` operations,
//! `date` parsing/extraction, `text` pattern matching, and `logic`/
//! `utility` helpers. The full set is compile-time known; [`all`] is the
//! single place that enumerates it for registration.

pub mod dates;
pub mod logic;
pub mod numeric;
pub mod text;

pub use dates::{DateInfer, DateMonth, DateWeek, DateWeekday};
pub use logic::{DefaultIfNone, Equals};
pub use numeric::{Add, AmountToFloat, Divide, Multiply, Subtract};
pub use text::RegexExtract;

use crate::command::Command;

/// Every built-in command, in catalog order.
pub fn all() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(DateInfer),
        Box::new(AmountToFloat),
        Box::new(Add),
        Box::new(Subtract),
        Box::new(Multiply),
        Box::new(Divide),
        Box::new(RegexExtract),
        Box::new(DefaultIfNone),
        Box::new(Equals),
        Box::new(DateMonth),
        Box::new(DateWeek),
        Box::new(DateWeekday),
    ]
}
