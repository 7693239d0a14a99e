//! Input validation
//!
//! Rules are small reusable closures (see [`validators`]). A [`Validator`]
//! applies them field by field and keeps every violation, so an operation
//! reports all problems with its input at once instead of the first one.

pub mod collector;
pub mod validators;

pub use collector::{FieldRules, Validator};
pub use validators::{email, min_length, not_empty};
