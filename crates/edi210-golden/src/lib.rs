#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edi210-golden
//!
//! The Golden Invoice v0.1 output data model.
//!
//! This crate holds the normalized record shape every parsed EDI 210
//! document is assembled into. Absent values are genuine `Option`s and
//! serialize as JSON null, never as a sentinel string.

/// Golden invoice record and its nested sections.
pub mod invoice;

pub use invoice::{
    Carrier, Charges, Customer, Dates, Evidence, GoldenInvoice, Metadata, OtherCharge, Parties,
    Refs, Side, Source, SourceType,
};

/// Fixed schema version stamped into every record's metadata.
pub const GOLDEN_SCHEMA_VERSION: &str = "0.1";
