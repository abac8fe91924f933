//! # edi210-pipeline
//!
//! Parse orchestration for EDI 210 interchanges: transaction-set
//! splitting, envelope enforcement, profile resolution, extraction, and
//! schema validation, aggregated into a parse report.
//!
//! Each parse call is a synchronous, side-effect-free transform over its
//! own input. The only shared state is the profile snapshot, read through
//! an `Arc`; concurrent calls need no coordination.

/// The pipeline orchestrator and parse report types.
pub mod pipeline;

pub use pipeline::{Edi210Pipeline, ParseReport, ParsedInvoice, REQUIRED_TAGS};

use thiserror::Error;

/// Abort-class parse failures. None of these carry a partial invoice.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required segment: {tag}")]
    Structural { tag: String },

    #[error("Failed to extract partner and EDI version from GS segment")]
    Envelope,

    #[error(transparent)]
    Profile(#[from] edi210_profile::Error),

    #[error(transparent)]
    Extract(#[from] edi210_extract::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Crate-local result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
