//! Field-error and outcome types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Constraint families a field can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    /// Field must be present.
    Required,
    /// Wrong JSON type.
    Type,
    /// Value outside a fixed enumeration.
    Enum,
    /// String shorter than the minimum.
    MinLength,
    /// String not of the exact required length.
    Length,
    /// Malformed value (e.g. not a calendar date).
    Format,
    /// Number outside its allowed range.
    Range,
    /// Value differs from a fixed constant.
    Const,
    /// Key not part of the schema.
    UnknownField,
}

/// One field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the failing field (e.g. `charges.other[0].amount`).
    pub field_path: String,

    /// Human-readable description including the offending value.
    pub message: String,

    /// Violated constraint family.
    pub constraint_type: ConstraintType,
}

impl FieldError {
    /// Build an error for `field_path`.
    pub fn new(
        field_path: impl Into<String>,
        message: impl Into<String>,
        constraint_type: ConstraintType,
    ) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
            constraint_type,
        }
    }
}

/// Result of validating one assembled record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the record satisfies the contract.
    pub is_valid: bool,

    /// Errors in field order; empty when valid.
    pub errors: Vec<FieldError>,

    /// The coerced/normalized record; present only when valid.
    pub validated: Option<Value>,
}

impl ValidationOutcome {
    /// Successful outcome carrying the normalized record.
    pub fn valid(validated: Value) -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            validated: Some(validated),
        }
    }

    /// Failed outcome carrying the ordered error list.
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: false,
            errors,
            validated: None,
        }
    }
}
