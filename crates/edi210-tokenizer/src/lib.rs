//! # edi210-tokenizer
//!
//! Segment table construction and transaction-set splitting for EDI 210
//! documents.
//!
//! Raw interchange text is split into positional segments and grouped by
//! tag, preserving document order within each tag. Structural enforcement
//! (required envelope segments) is deliberately left to downstream stages;
//! this crate never fails.

/// Segment and segment-table model.
pub mod segment;
/// Delimiter-based tokenization and transaction-set batching.
pub mod tokenizer;

pub use segment::{Segment, SegmentTable};
pub use tokenizer::{tokenize, tokenize_transaction_sets};

/// Element delimiter for EDI 210 documents.
pub const ELEMENT_DELIMITER: char = '*';

/// Segment delimiter for EDI 210 documents.
pub const SEGMENT_DELIMITER: char = '~';
