//! # edi210-validation
//!
//! Structural validation of assembled golden invoices against the closed
//! Golden Invoice v0.1 shape.
//!
//! The validator walks a dynamic JSON value so that it can reject unknown
//! fields at every nesting level and report field-path errors the way the
//! output contract requires: on success the coerced/normalized record, on
//! failure an ordered error list — never a partial success.

/// Field-error and outcome types.
pub mod outcome;
/// The schema walk itself.
pub mod validator;

pub use outcome::{ConstraintType, FieldError, ValidationOutcome};
pub use validator::GoldenValidator;
