//! Golden invoice record and its nested sections
#![allow(clippy::must_use_candidate)] // Plain data constructors intentionally omit pervasive #[must_use].

use serde::{Deserialize, Serialize};

use crate::GOLDEN_SCHEMA_VERSION;

/// The normalized golden invoice record.
///
/// Created fresh per parse call, never mutated after assembly, and
/// consumed immediately by the schema validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenInvoice {
    /// Carrier invoice identifier.
    pub invoice_id: String,

    /// Which side of the transaction this document represents.
    pub side: Side,

    /// Where the document came from.
    pub source: Source,

    /// Carrier identity, when known.
    pub carrier: Carrier,

    /// Customer identity, when known.
    pub customer: Customer,

    /// Reference numbers.
    pub refs: Refs,

    /// Shipment parties.
    pub parties: Parties,

    /// Invoice and shipment dates (ISO calendar dates).
    pub dates: Dates,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Charge buckets and uncategorized charges.
    pub charges: Charges,

    /// Authoritative invoice total.
    pub total: f64,

    /// Parse provenance and confidence.
    pub metadata: Metadata,

    /// Supporting evidence references.
    pub evidence: Evidence,
}

/// Buy/sell side of the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// Document source descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Kind of source document.
    #[serde(rename = "type")]
    pub kind: SourceType,

    /// URI of the source document, when tracked.
    pub doc_uri: Option<String>,
}

/// Recognized source document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Edi210,
    Pdf,
    Image,
    Csv,
    Api,
}

/// Carrier identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Carrier {
    pub name: Option<String>,
    pub scac: Option<String>,
}

/// Customer identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: Option<String>,
    pub account_id: Option<String>,
}

/// Reference numbers carried on the invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Refs {
    /// Bill-of-lading number.
    pub bol: Option<String>,
    /// Carrier PRO number.
    pub pro: Option<String>,
    /// Purchase order number.
    pub po: Option<String>,
    /// Internal load identifier.
    pub load_id: Option<String>,
}

/// Shipment parties by role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parties {
    pub ship_from: Option<String>,
    pub ship_to: Option<String>,
    pub bill_to: Option<String>,
}

/// Invoice and shipment dates as ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dates {
    pub invoice: Option<String>,
    pub pickup: Option<String>,
    pub delivery: Option<String>,
}

/// Charge buckets plus uncategorized charges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Charges {
    pub base_freight: f64,
    pub fuel_surcharge: f64,
    pub detention: f64,
    pub other: Vec<OtherCharge>,
}

/// One uncategorized charge line, deduplicated by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherCharge {
    /// Charge code as it appears on the line.
    pub code: String,
    /// Human-readable description from the line, when present.
    pub desc: Option<String>,
    /// Line amount.
    pub amount: f64,
}

/// Parse provenance and confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Always [`GOLDEN_SCHEMA_VERSION`].
    pub golden_schema_version: String,

    /// Version of the parser that produced the record.
    pub parser_version: String,

    /// EDI version read from the interchange.
    pub edi_version: Option<String>,

    /// Trading partner read from the interchange.
    pub trading_partner: Option<String>,

    /// Heuristic reliability score accumulated during extraction.
    pub confidence: Option<f64>,
}

impl Metadata {
    /// Metadata for a fresh parse, stamped with the fixed schema version.
    pub fn new(
        parser_version: impl Into<String>,
        edi_version: Option<String>,
        trading_partner: Option<String>,
        confidence: f64,
    ) -> Self {
        Self {
            golden_schema_version: GOLDEN_SCHEMA_VERSION.to_string(),
            parser_version: parser_version.into(),
            edi_version,
            trading_partner,
            confidence: Some(confidence),
        }
    }
}

/// Supporting evidence references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    pub doc_uri: Option<String>,
    pub attachments: Vec<String>,
}
