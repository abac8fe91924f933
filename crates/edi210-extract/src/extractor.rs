//! Field-by-field resolution and golden-invoice assembly
//!
//! Drives one extraction pass: header fields, side determination,
//! parties, dates, charge aggregation, total reconciliation, and the
//! final composition into the golden-invoice shape.

use chrono::NaiveDate;
use tracing::debug;

use edi210_golden::{
    Carrier, Charges, Customer, Dates, Evidence, GoldenInvoice, Metadata, Parties, Refs, Side,
    Source, SourceType,
};
use edi210_profile::{DateTarget, FieldRule, PartyTarget, Profile};
use edi210_tokenizer::SegmentTable;

use crate::charges;
use crate::rules::{QUALIFIER_ELEMENT, resolve_field, resolve_first_of};
use crate::tracker::{PenaltyKind, Tracker};
use crate::{Error, Result};

/// GS element holding the trading-partner (application sender) code.
pub const GS_PARTNER_ELEMENT: usize = 2;
/// GS element compared against our organization id for side
/// determination.
pub const GS_SIDE_ELEMENT: usize = 3;
/// GS element holding the EDI version.
pub const GS_VERSION_ELEMENT: usize = 8;

/// Element of a date segment holding the date value.
const DATE_VALUE_ELEMENT: usize = 2;

/// Per-process extraction settings, read-only during a parse call.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    /// Identifier this organization trades under; drives buy/sell side.
    pub our_org_id: String,

    /// Version stamped into every record's metadata.
    pub parser_version: String,
}

impl Default for ExtractionContext {
    fn default() -> Self {
        Self {
            our_org_id: "OURBROKER".to_string(),
            parser_version: "1.0.0".to_string(),
        }
    }
}

/// One assembled invoice plus the diagnostics emitted while building it.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// The assembled record, ready for schema validation.
    pub invoice: GoldenInvoice,

    /// Human-readable warnings in emission order.
    pub warnings: Vec<String>,
}

/// Run one extraction pass over a tokenized transaction set.
///
/// `partner` and `edi_version` come from the interchange envelope and are
/// copied into the record's metadata. Abort-class failures return an
/// [`Error`] with no partial invoice.
pub fn extract(
    table: &SegmentTable,
    profile: &Profile,
    partner: &str,
    edi_version: &str,
    context: &ExtractionContext,
) -> Result<ExtractionOutcome> {
    let mut tracker = Tracker::new();
    let header = &profile.segments.header;

    let invoice_id =
        resolve_field(table, &header.invoice_id).ok_or_else(|| Error::RequiredFieldMissing {
            field: "invoice_id".to_string(),
        })?;
    debug!(invoice_id = %invoice_id, partner, "extracting invoice");

    let side = resolve_side(table, &context.our_org_id);

    let bol = header.bol.as_ref().and_then(|chain| {
        resolve_first_of(table, chain).or_else(|| {
            if let Some(last) = chain.first_of.last() {
                tracker.warn_and_penalize(
                    format!("{} not found.", last.seg),
                    PenaltyKind::SoftFieldMissing,
                );
            }
            None
        })
    });
    let pro = resolve_optional(table, header.pro.as_ref(), &mut tracker);
    let load_id = resolve_optional(table, header.load_id.as_ref(), &mut tracker);

    let parties = resolve_parties(table, profile, &mut tracker);
    let (pickup, delivery) = resolve_dates(table, profile, &mut tracker)?;

    let invoice_date = match resolve_field(table, &header.invoice_date) {
        Some(raw) => Some(to_iso_date(&raw)?),
        None => {
            tracker.warn_and_penalize(
                format!("{} not found.", header.invoice_date.seg),
                PenaltyKind::InvoiceDateMissing,
            );
            None
        }
    };

    let totals = charges::aggregate(table, &profile.segments.charges, &mut tracker)?;
    let total = resolve_total(table, profile, &totals, &mut tracker)?;

    let (warnings, confidence) = tracker.into_parts();
    let invoice = GoldenInvoice {
        invoice_id,
        side,
        source: Source {
            kind: SourceType::Edi210,
            doc_uri: None,
        },
        carrier: Carrier::default(),
        customer: Customer::default(),
        refs: Refs {
            bol,
            pro,
            po: None,
            load_id,
        },
        parties,
        dates: Dates {
            invoice: invoice_date,
            pickup,
            delivery,
        },
        currency: profile.currency.default.clone(),
        charges: Charges {
            base_freight: totals.base_freight,
            fuel_surcharge: totals.fuel_surcharge,
            detention: totals.detention,
            other: totals.other,
        },
        total,
        metadata: Metadata::new(
            context.parser_version.clone(),
            Some(edi_version.to_string()),
            Some(partner.to_string()),
            confidence,
        ),
        evidence: Evidence::default(),
    };

    Ok(ExtractionOutcome { invoice, warnings })
}

fn resolve_side(table: &SegmentTable, our_org_id: &str) -> Side {
    let ours = table
        .first("GS")
        .and_then(|gs| gs.element(GS_SIDE_ELEMENT))
        .is_some_and(|code| code == our_org_id);
    if ours { Side::Buy } else { Side::Sell }
}

fn resolve_optional(
    table: &SegmentTable,
    rule: Option<&FieldRule>,
    tracker: &mut Tracker,
) -> Option<String> {
    let rule = rule?;
    resolve_field(table, rule).or_else(|| {
        tracker.warn_and_penalize(
            format!("{} not found.", rule.seg),
            PenaltyKind::SoftFieldMissing,
        );
        None
    })
}

fn resolve_parties(table: &SegmentTable, profile: &Profile, tracker: &mut Tracker) -> Parties {
    let rules = &profile.segments.parties;
    let mut parties = Parties::default();

    let Some(first) = rules.first() else {
        tracker.warn("No parties rules defined in profile.");
        return parties;
    };
    let Some(instances) = table.get(&first.seg) else {
        tracker.warn_and_penalize(
            format!("{} segment not found.", first.seg),
            PenaltyKind::SoftFieldMissing,
        );
        return parties;
    };

    for instance in instances {
        for rule in rules {
            if instance.element(QUALIFIER_ELEMENT) != Some(rule.qual.as_str()) {
                continue;
            }
            let name = instance
                .element(rule.name_idx)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            let slot = match rule.map_to {
                PartyTarget::ShipFrom => &mut parties.ship_from,
                PartyTarget::ShipTo => &mut parties.ship_to,
                PartyTarget::BillTo => &mut parties.bill_to,
            };
            if slot.is_none() {
                *slot = name;
            }
        }
    }
    parties
}

fn resolve_dates(
    table: &SegmentTable,
    profile: &Profile,
    tracker: &mut Tracker,
) -> Result<(Option<String>, Option<String>)> {
    let rules = &profile.segments.dates;
    let mut pickup = None;
    let mut delivery = None;

    let Some(first) = rules.first() else {
        tracker.warn("No dates rules defined in profile.");
        return Ok((pickup, delivery));
    };
    if !table.contains(&first.seg) {
        tracker.warn_and_penalize(
            format!("{} segment not found.", first.seg),
            PenaltyKind::SoftFieldMissing,
        );
        return Ok((pickup, delivery));
    }

    for rule in rules {
        let raw = resolve_field(
            table,
            &FieldRule {
                seg: rule.seg.clone(),
                idx: DATE_VALUE_ELEMENT,
                qual: Some(rule.qual.clone()),
            },
        );
        let resolved = match raw {
            Some(value) => Some(to_iso_date(&value)?),
            None => {
                tracker.warn_and_penalize(
                    format!("{} not found.", rule.seg),
                    PenaltyKind::SoftFieldMissing,
                );
                None
            }
        };
        match rule.map_to {
            DateTarget::Pickup => pickup = resolved,
            DateTarget::Delivery => delivery = resolved,
        }
    }
    Ok((pickup, delivery))
}

fn resolve_total(
    table: &SegmentTable,
    profile: &Profile,
    totals: &charges::ChargeTotals,
    tracker: &mut Tracker,
) -> Result<f64> {
    let rule = &profile.segments.total;
    let sum = round2(totals.sum());

    let reported = table
        .first(&rule.seg)
        .and_then(|segment| segment.element(rule.idx))
        .filter(|v| !v.is_empty());

    match reported {
        Some(raw) => {
            let total = raw.parse::<f64>().map_err(|_| Error::MalformedAmount {
                value: raw.to_string(),
            })?;
            if round2(total) != sum {
                tracker.warn_and_penalize(
                    format!("Total from EDI {raw} does not match sum of charges {sum}."),
                    PenaltyKind::TotalMismatch,
                );
            }
            Ok(total)
        }
        None => {
            tracker.warn_and_penalize(
                "Total segment not found.".to_string(),
                PenaltyKind::TotalSegmentMissing,
            );
            Ok(sum)
        }
    }
}

fn to_iso_date(raw: &str) -> Result<String> {
    let malformed = || Error::MalformedDate {
        value: raw.to_string(),
    };
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let date = NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| malformed())?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
