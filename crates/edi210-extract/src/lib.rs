//! # edi210-extract
//!
//! The profile-driven extraction engine: a declarative field-rule
//! evaluator, charge-bucket aggregation, the confidence/warning tracker,
//! and the golden-invoice assembler.
//!
//! Extraction is a pure transform over one segment table and one resolved
//! profile. Abort-class failures surface as [`Error`]; soft failures
//! accumulate into the tracker as warnings and penalty events.

/// L1/SAC charge-line aggregation into buckets.
pub mod charges;
/// Field-by-field resolution and golden-invoice assembly.
pub mod extractor;
/// Declarative field-rule evaluation over a segment table.
pub mod rules;
/// Ordered warning and penalty-event accumulation.
pub mod tracker;

pub use charges::ChargeTotals;
pub use extractor::{ExtractionContext, ExtractionOutcome, extract};
pub use tracker::{PenaltyKind, Tracker};

use thiserror::Error;

/// Abort-class extraction failures. No partial invoice accompanies any of
/// these.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Malformed date '{value}': expected 8-digit YYYYMMDD")]
    MalformedDate { value: String },

    #[error("Malformed amount '{value}'")]
    MalformedAmount { value: String },

    #[error("{tag} segment not found")]
    ChargeSegmentMissing { tag: String },
}

/// Crate-local result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
