//! Profile rule model deserialized from profile documents
//!
//! The shape mirrors the profile JSON contract: `segments.header.*` field
//! rules, `segments.parties[]`, `segments.dates[]`, `segments.charges`,
//! `segments.total`, and `currency.default`. Rules are plain data; the
//! extraction engine interprets them.

use serde::{Deserialize, Serialize};

/// A partner/version extraction profile. Read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Segment-level extraction rules.
    pub segments: SegmentRules,

    /// Currency configuration.
    pub currency: CurrencyRules,
}

/// The `segments` block of a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentRules {
    /// Header field rules (invoice id, invoice date, bol, pro, load id).
    pub header: HeaderRules,

    /// Party rules, one per logical role.
    #[serde(default)]
    pub parties: Vec<PartyRule>,

    /// Date rules, one per logical role.
    #[serde(default)]
    pub dates: Vec<DateRule>,

    /// Charge strategy and bucket rules.
    pub charges: ChargeRules,

    /// Total-amount rule.
    pub total: TotalRule,
}

/// Header field rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderRules {
    /// Invoice id rule. Required; extraction aborts when unresolvable.
    pub invoice_id: FieldRule,

    /// Invoice date rule.
    pub invoice_date: FieldRule,

    /// Bill-of-lading fallback chain.
    pub bol: Option<FirstOfRule>,

    /// PRO number rule.
    pub pro: Option<FieldRule>,

    /// Load id rule.
    pub load_id: Option<FieldRule>,
}

/// A single element extraction rule: segment tag, element index, and an
/// optional qualifier restricting which repeated instance is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRule {
    /// Segment tag to read from.
    pub seg: String,

    /// Element index of the value.
    pub idx: usize,

    /// Qualifier matched exactly against element 1, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qual: Option<String>,
}

/// An ordered list of field rules tried in order; first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FirstOfRule {
    /// Rules in priority order.
    #[serde(rename = "firstOf")]
    pub first_of: Vec<FieldRule>,
}

/// A party rule keyed on a qualifier value and a name element index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartyRule {
    /// Logical role this rule feeds.
    #[serde(rename = "mapTo")]
    pub map_to: PartyTarget,

    /// Party segment tag (conventionally N1).
    pub seg: String,

    /// Qualifier matched against element 1.
    pub qual: String,

    /// Element index of the party name.
    #[serde(rename = "nameIdx")]
    pub name_idx: usize,
}

/// Logical party roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyTarget {
    #[serde(rename = "parties.ship_from")]
    ShipFrom,
    #[serde(rename = "parties.ship_to")]
    ShipTo,
    #[serde(rename = "parties.bill_to")]
    BillTo,
}

/// A date rule keyed on a qualifier value; the date value is read from a
/// fixed element position of the date segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRule {
    /// Logical date this rule feeds.
    #[serde(rename = "mapTo")]
    pub map_to: DateTarget,

    /// Date segment tag (conventionally G62).
    pub seg: String,

    /// Qualifier matched against element 1.
    pub qual: String,
}

/// Logical shipment dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateTarget {
    #[serde(rename = "dates.pickup")]
    Pickup,
    #[serde(rename = "dates.delivery")]
    Delivery,
}

/// Charge strategy and bucket rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChargeRules {
    /// Which charge-line segment types participate.
    pub strategy: ChargeStrategy,

    /// Bucket rules for L1 (freight charge) lines.
    #[serde(default)]
    pub l1_rules: Vec<L1Rule>,

    /// Bucket rules for SAC (special/accessorial charge) lines.
    #[serde(default)]
    pub sac_rules: Vec<SacRule>,
}

/// Charge-bucketing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeStrategy {
    /// Only L1 lines; absence of any L1 segment is a hard failure.
    #[serde(rename = "L1_only")]
    L1Only,
    /// Only SAC lines; absence is a hard failure.
    #[serde(rename = "SAC_only")]
    SacOnly,
    /// Both participate; a missing type contributes zero, non-fatally.
    #[serde(rename = "L1_then_SAC")]
    L1ThenSac,
}

/// An L1 bucket rule: a line matches when any of its elements equals one
/// of the `contains` tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct L1Rule {
    /// Target numeric bucket.
    #[serde(rename = "mapTo")]
    pub map_to: ChargeBucket,

    /// Tokens matched exactly against any element of the line.
    #[serde(default)]
    pub contains: Vec<String>,
}

/// A SAC bucket rule: a line matches when its charge-code element equals
/// one of the `codeIn` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SacRule {
    /// Target numeric bucket.
    #[serde(rename = "mapTo")]
    pub map_to: ChargeBucket,

    /// Charge codes matched against the fixed code element.
    #[serde(default, rename = "codeIn")]
    pub code_in: Vec<String>,
}

/// Numeric buckets a charge rule can feed. An unrecognized `mapTo` value
/// is a profile-format error at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeBucket {
    #[serde(rename = "charges.base_freight")]
    BaseFreight,
    #[serde(rename = "charges.fuel_surcharge")]
    FuelSurcharge,
    #[serde(rename = "charges.detention")]
    Detention,
}

/// Total-amount rule: fixed segment and element index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TotalRule {
    /// Total segment tag (conventionally L3).
    pub seg: String,

    /// Element index of the reported total.
    pub idx: usize,
}

/// Currency configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrencyRules {
    /// Default currency applied to every invoice for this profile.
    pub default: String,
}

impl Profile {
    /// Check cross-field consistency that serde alone cannot express:
    /// strategies must carry the rule lists they select.
    pub fn verify(&self) -> crate::Result<()> {
        let charges = &self.segments.charges;
        match charges.strategy {
            ChargeStrategy::L1Only if charges.l1_rules.is_empty() => Err(
                crate::Error::InvalidFormat("strategy L1_only requires l1_rules".to_string()),
            ),
            ChargeStrategy::SacOnly if charges.sac_rules.is_empty() => Err(
                crate::Error::InvalidFormat("strategy SAC_only requires sac_rules".to_string()),
            ),
            ChargeStrategy::L1ThenSac
                if charges.l1_rules.is_empty() || charges.sac_rules.is_empty() =>
            {
                Err(crate::Error::InvalidFormat(
                    "strategy L1_then_SAC requires both l1_rules and sac_rules".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Complete profile document shared by tests across the crate.
#[cfg(test)]
pub(crate) const SAMPLE_PROFILE_JSON: &str = r#"{
      "segments": {
        "header": {
          "invoice_id": { "seg": "B3", "idx": 2 },
          "invoice_date": { "seg": "B3", "idx": 6 },
          "bol": { "firstOf": [
            { "seg": "B3", "idx": 3 },
            { "seg": "REF", "qual": "BM", "idx": 2 }
          ]},
          "pro": { "seg": "REF", "qual": "CN", "idx": 2 },
          "load_id": { "seg": "REF", "qual": "LO", "idx": 2 }
        },
        "parties": [
          { "mapTo": "parties.ship_from", "seg": "N1", "qual": "SH", "nameIdx": 2 },
          { "mapTo": "parties.ship_to", "seg": "N1", "qual": "CN", "nameIdx": 2 },
          { "mapTo": "parties.bill_to", "seg": "N1", "qual": "BT", "nameIdx": 2 }
        ],
        "dates": [
          { "mapTo": "dates.pickup", "seg": "G62", "qual": "11" },
          { "mapTo": "dates.delivery", "seg": "G62", "qual": "70" }
        ],
        "charges": {
          "strategy": "L1_then_SAC",
          "l1_rules": [
            { "mapTo": "charges.base_freight", "contains": ["400", "LHS"] },
            { "mapTo": "charges.fuel_surcharge", "contains": ["405", "FUE"] }
          ],
          "sac_rules": [
            { "mapTo": "charges.fuel_surcharge", "codeIn": ["FUE"] },
            { "mapTo": "charges.detention", "codeIn": ["DTL"] }
          ]
        },
        "total": { "seg": "L3", "idx": 5 }
      },
      "currency": { "default": "USD" }
    }"#;

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_JSON: &str = SAMPLE_PROFILE_JSON;

    #[test]
    fn test_profile_deserializes() {
        let profile: Profile = serde_json::from_str(PROFILE_JSON).unwrap();
        assert_eq!(profile.segments.header.invoice_id.seg, "B3");
        assert_eq!(profile.segments.header.invoice_id.idx, 2);
        assert_eq!(profile.segments.parties.len(), 3);
        assert_eq!(profile.segments.parties[0].map_to, PartyTarget::ShipFrom);
        assert_eq!(profile.segments.dates[1].map_to, DateTarget::Delivery);
        assert_eq!(
            profile.segments.charges.strategy,
            ChargeStrategy::L1ThenSac
        );
        assert_eq!(
            profile.segments.charges.l1_rules[0].map_to,
            ChargeBucket::BaseFreight
        );
        assert_eq!(profile.segments.charges.sac_rules[1].code_in, vec!["DTL"]);
        assert_eq!(profile.segments.total.seg, "L3");
        assert_eq!(profile.currency.default, "USD");
        profile.verify().unwrap();
    }

    #[test]
    fn test_unknown_bucket_is_a_format_error() {
        let bad = PROFILE_JSON.replace("charges.base_freight", "charges.handling");
        assert!(serde_json::from_str::<Profile>(&bad).is_err());
    }

    #[test]
    fn test_unknown_strategy_is_a_format_error() {
        let bad = PROFILE_JSON.replace("L1_then_SAC", "SAC_then_L1");
        assert!(serde_json::from_str::<Profile>(&bad).is_err());
    }

    #[test]
    fn test_verify_rejects_strategy_without_rules() {
        let bad = PROFILE_JSON.replace(r#""strategy": "L1_then_SAC""#, r#""strategy": "SAC_only""#);
        let bad = bad.replace(r#""sac_rules": ["#, r#""ignored_sac": ["#);
        // renaming the key makes serde reject it under deny_unknown_fields
        assert!(serde_json::from_str::<Profile>(&bad).is_err());

        let mut profile: Profile = serde_json::from_str(PROFILE_JSON).unwrap();
        profile.segments.charges.strategy = ChargeStrategy::SacOnly;
        profile.segments.charges.sac_rules.clear();
        assert!(profile.verify().is_err());
    }

    #[test]
    fn test_qualifier_is_optional_on_field_rules() {
        let rule: FieldRule = serde_json::from_str(r#"{ "seg": "B3", "idx": 2 }"#).unwrap();
        assert!(rule.qual.is_none());
    }
}
