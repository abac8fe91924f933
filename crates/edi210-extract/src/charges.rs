//! L1/SAC charge-line aggregation into buckets
//!
//! The profile's strategy selects which charge-line segment types
//! participate. Bucket rules are scanned once per rule over all lines of
//! the relevant type; lines matching no rule become "other" entries,
//! deduplicated by charge code, each distinct code carrying one warning
//! and one penalty.

use std::collections::HashSet;

use tracing::debug;

use edi210_golden::OtherCharge;
use edi210_profile::{ChargeBucket, ChargeRules, ChargeStrategy, L1Rule, SacRule};
use edi210_tokenizer::{Segment, SegmentTable};

use crate::tracker::{PenaltyKind, Tracker};
use crate::{Error, Result};

/// Freight-charge line tag.
pub const L1_TAG: &str = "L1";
/// Special/accessorial-charge line tag.
pub const SAC_TAG: &str = "SAC";

// Fixed element positions on the two charge-line layouts.
const L1_AMOUNT_ELEMENT: usize = 2;
const L1_CODE_ELEMENT: usize = 5;
const SAC_AMOUNT_ELEMENT: usize = 5;
const SAC_CODE_ELEMENT: usize = 2;

/// Aggregated charge buckets plus uncategorized lines.
#[derive(Debug, Default, Clone)]
pub struct ChargeTotals {
    pub base_freight: f64,
    pub fuel_surcharge: f64,
    pub detention: f64,
    pub other: Vec<OtherCharge>,
}

impl ChargeTotals {
    fn bucket_mut(&mut self, bucket: ChargeBucket) -> &mut f64 {
        match bucket {
            ChargeBucket::BaseFreight => &mut self.base_freight,
            ChargeBucket::FuelSurcharge => &mut self.fuel_surcharge,
            ChargeBucket::Detention => &mut self.detention,
        }
    }

    /// Sum of all buckets and "other" amounts, unrounded.
    pub fn sum(&self) -> f64 {
        self.base_freight
            + self.fuel_surcharge
            + self.detention
            + self.other.iter().map(|o| o.amount).sum::<f64>()
    }
}

/// Apply the profile's charge strategy to the table.
///
/// `L1_only`/`SAC_only` abort when their sole segment type is absent;
/// `L1_then_SAC` treats an absent type as zero contribution with a
/// warning and penalty.
pub fn aggregate(
    table: &SegmentTable,
    rules: &ChargeRules,
    tracker: &mut Tracker,
) -> Result<ChargeTotals> {
    let mut totals = ChargeTotals::default();

    match rules.strategy {
        ChargeStrategy::L1Only => {
            let lines = require_lines(table, L1_TAG)?;
            aggregate_l1(lines, &rules.l1_rules, &mut totals, tracker)?;
        }
        ChargeStrategy::SacOnly => {
            let lines = require_lines(table, SAC_TAG)?;
            aggregate_sac(lines, &rules.sac_rules, &mut totals, tracker)?;
        }
        ChargeStrategy::L1ThenSac => {
            match table.get(L1_TAG) {
                Some(lines) => aggregate_l1(lines, &rules.l1_rules, &mut totals, tracker)?,
                None => tracker.warn_and_penalize(
                    format!("{L1_TAG} segment not found."),
                    PenaltyKind::ChargeSegmentMissing,
                ),
            }
            match table.get(SAC_TAG) {
                Some(lines) => aggregate_sac(lines, &rules.sac_rules, &mut totals, tracker)?,
                None => tracker.warn_and_penalize(
                    format!("{SAC_TAG} segment not found."),
                    PenaltyKind::ChargeSegmentMissing,
                ),
            }
        }
    }

    debug!(
        base_freight = totals.base_freight,
        fuel_surcharge = totals.fuel_surcharge,
        detention = totals.detention,
        other = totals.other.len(),
        "charges aggregated"
    );
    Ok(totals)
}

fn require_lines<'t>(table: &'t SegmentTable, tag: &str) -> Result<&'t [Segment]> {
    table.get(tag).ok_or_else(|| Error::ChargeSegmentMissing {
        tag: tag.to_string(),
    })
}

fn aggregate_l1(
    lines: &[Segment],
    rules: &[L1Rule],
    totals: &mut ChargeTotals,
    tracker: &mut Tracker,
) -> Result<()> {
    aggregate_lines(
        lines,
        rules,
        |rule| rule.map_to,
        |rule, line| rule.contains.iter().any(|token| line.contains_token(token)),
        L1_AMOUNT_ELEMENT,
        L1_CODE_ELEMENT,
        totals,
        tracker,
    )
}

fn aggregate_sac(
    lines: &[Segment],
    rules: &[SacRule],
    totals: &mut ChargeTotals,
    tracker: &mut Tracker,
) -> Result<()> {
    aggregate_lines(
        lines,
        rules,
        |rule| rule.map_to,
        |rule, line| {
            line.element(SAC_CODE_ELEMENT)
                .is_some_and(|code| rule.code_in.iter().any(|c| c == code))
        },
        SAC_AMOUNT_ELEMENT,
        SAC_CODE_ELEMENT,
        totals,
        tracker,
    )
}

/// One aggregation pass over a single segment type.
///
/// Matched lines add their amount to the rule's bucket and mark their
/// code as categorized. Afterward, every line matching no rule becomes
/// one "other" entry per distinct code, with one warning and one penalty
/// per distinct code regardless of how many raw lines share it.
#[allow(clippy::too_many_arguments)]
fn aggregate_lines<R>(
    lines: &[Segment],
    rules: &[R],
    bucket_of: impl Fn(&R) -> ChargeBucket,
    matches: impl Fn(&R, &Segment) -> bool,
    amount_element: usize,
    code_element: usize,
    totals: &mut ChargeTotals,
    tracker: &mut Tracker,
) -> Result<()> {
    let mut categorized: HashSet<String> = HashSet::new();

    for rule in rules {
        for line in lines {
            if !matches(rule, line) {
                continue;
            }
            let amount = parse_amount(line.element(amount_element))?;
            *totals.bucket_mut(bucket_of(rule)) += amount;
            categorized.insert(line_code(line, code_element));
        }
    }

    for line in lines {
        if rules.iter().any(|rule| matches(rule, line)) {
            continue;
        }
        let code = line_code(line, code_element);
        if categorized.contains(&code) || totals.other.iter().any(|o| o.code == code) {
            continue;
        }
        let amount = parse_amount(line.element(amount_element))?;
        let desc = line.last_element().filter(|d| !d.is_empty());
        tracker.warn_and_penalize(
            format!(
                "Other charge added: {} - {}",
                desc.unwrap_or(&code),
                line.element(amount_element).unwrap_or_default()
            ),
            PenaltyKind::UncategorizedCharge,
        );
        totals.other.push(OtherCharge {
            code,
            desc: desc.map(str::to_string),
            amount,
        });
    }

    Ok(())
}

fn line_code(line: &Segment, code_element: usize) -> String {
    line.element(code_element).unwrap_or_default().to_string()
}

fn parse_amount(raw: Option<&str>) -> Result<f64> {
    let raw = raw.unwrap_or_default();
    raw.parse::<f64>().map_err(|_| Error::MalformedAmount {
        value: raw.to_string(),
    })
}
