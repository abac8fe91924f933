//! The pipeline orchestrator and parse report types

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use edi210_extract::extractor::{
    ExtractionContext, GS_PARTNER_ELEMENT, GS_VERSION_ELEMENT, extract,
};
use edi210_golden::GoldenInvoice;
use edi210_profile::ProfileRegistry;
use edi210_tokenizer::{SegmentTable, tokenize_transaction_sets};
use edi210_validation::{GoldenValidator, ValidationOutcome};

use crate::{Error, Result};

/// Segments every transaction-set batch must carry, checked before
/// profile resolution.
pub const REQUIRED_TAGS: [&str; 5] = ["ISA", "GS", "ST", "B3", "SE"];

/// One parsed transaction set: the assembled invoice, its extraction
/// warnings, and its schema-validation outcome.
#[derive(Debug, Serialize)]
pub struct ParsedInvoice {
    /// The assembled golden invoice.
    pub invoice: GoldenInvoice,

    /// Extraction warnings in emission order.
    pub warnings: Vec<String>,

    /// Outcome of validating the assembled record.
    pub validation: ValidationOutcome,
}

/// Everything produced by one parse call.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    /// One entry per transaction-set batch, in document order.
    pub results: Vec<ParsedInvoice>,
}

impl ParseReport {
    /// Whether every record passed schema validation.
    pub fn all_valid(&self) -> bool {
        self.results.iter().all(|r| r.validation.is_valid)
    }

    /// All extraction warnings across batches, in emission order.
    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .flat_map(|r| r.warnings.iter().cloned())
            .collect()
    }
}

/// Orchestrates tokenize → resolve → extract → assemble → validate for
/// one interchange.
pub struct Edi210Pipeline {
    profiles: Arc<ProfileRegistry>,
    context: ExtractionContext,
    validator: GoldenValidator,
}

impl Edi210Pipeline {
    /// Build a pipeline over a profile snapshot.
    pub fn new(profiles: Arc<ProfileRegistry>, context: ExtractionContext) -> Self {
        Self {
            profiles,
            context,
            validator: GoldenValidator::new(),
        }
    }

    /// Parse a raw interchange into a report, one entry per transaction
    /// set. Abort-class failures in any batch fail the whole call with no
    /// invoice payload.
    pub fn parse(&self, text: &str) -> Result<ParseReport> {
        let batches = tokenize_transaction_sets(text);
        debug!(batches = batches.len(), "tokenized interchange");

        let mut results = Vec::with_capacity(batches.len());
        for table in &batches {
            results.push(self.parse_batch(table)?);
        }

        info!(
            invoices = results.len(),
            valid = results.iter().filter(|r| r.validation.is_valid).count(),
            "parse complete"
        );
        Ok(ParseReport { results })
    }

    fn parse_batch(&self, table: &SegmentTable) -> Result<ParsedInvoice> {
        for tag in REQUIRED_TAGS {
            if !table.contains(tag) {
                return Err(Error::Structural {
                    tag: tag.to_string(),
                });
            }
        }

        let (partner, edi_version) = envelope_identity(table)?;
        let profile = self.profiles.resolve(&partner, &edi_version)?;

        let outcome = extract(table, &profile, &partner, &edi_version, &self.context)?;
        let value = serde_json::to_value(&outcome.invoice)?;
        let validation = self.validator.validate(&value);

        Ok(ParsedInvoice {
            invoice: outcome.invoice,
            warnings: outcome.warnings,
            validation,
        })
    }
}

/// Read the trading-partner code and EDI version from the GS segment.
fn envelope_identity(table: &SegmentTable) -> Result<(String, String)> {
    let gs = table.first("GS").ok_or(Error::Envelope)?;
    let partner = gs
        .element(GS_PARTNER_ELEMENT)
        .filter(|v| !v.is_empty())
        .ok_or(Error::Envelope)?;
    let edi_version = gs
        .element(GS_VERSION_ELEMENT)
        .filter(|v| !v.is_empty())
        .ok_or(Error::Envelope)?;
    Ok((partner.to_string(), edi_version.to_string()))
}
