//! Declarative field-rule evaluation over a segment table
//!
//! One evaluator covers every profile: a rule either reads the first
//! instance of its segment directly, or scans repeated instances for a
//! qualifier match, or chains alternatives in priority order. Resolution
//! is first-match throughout; an empty element counts as absent.

use edi210_profile::{FieldRule, FirstOfRule};
use edi210_tokenizer::SegmentTable;

/// Element position qualifiers are matched against, by convention.
pub const QUALIFIER_ELEMENT: usize = 1;

/// Resolve a single field rule against the table.
///
/// Without a qualifier the first instance of the tag supplies the value;
/// with one, the first instance whose qualifier element matches exactly.
/// Returns `None` when the tag is absent, no instance matches, the index
/// is out of range, or the value is empty.
pub fn resolve_field(table: &SegmentTable, rule: &FieldRule) -> Option<String> {
    let instances = table.get(&rule.seg)?;
    let segment = match &rule.qual {
        None => instances.first()?,
        Some(qual) => instances
            .iter()
            .find(|s| s.element(QUALIFIER_ELEMENT) == Some(qual.as_str()))?,
    };
    segment
        .element(rule.idx)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve a first-of chain: rules are tried in order and the first that
/// resolves wins. Exactly one resolution attempt per rule; no
/// backtracking past the first segment match.
pub fn resolve_first_of(table: &SegmentTable, chain: &FirstOfRule) -> Option<String> {
    chain
        .first_of
        .iter()
        .find_map(|rule| resolve_field(table, rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi210_tokenizer::tokenize;

    fn rule(seg: &str, idx: usize, qual: Option<&str>) -> FieldRule {
        FieldRule {
            seg: seg.to_string(),
            idx,
            qual: qual.map(str::to_string),
        }
    }

    const DOC: &str = "B3**INV001*BOL001~REF*CN*PRO777~REF*LO*LOAD42~REF*CN*PRO888~";

    #[test]
    fn test_direct_rule_reads_first_instance() {
        let table = tokenize(DOC);
        assert_eq!(
            resolve_field(&table, &rule("B3", 2, None)),
            Some("INV001".to_string())
        );
    }

    #[test]
    fn test_qualified_rule_takes_first_matching_instance() {
        let table = tokenize(DOC);
        assert_eq!(
            resolve_field(&table, &rule("REF", 2, Some("CN"))),
            Some("PRO777".to_string())
        );
        assert_eq!(
            resolve_field(&table, &rule("REF", 2, Some("LO"))),
            Some("LOAD42".to_string())
        );
    }

    #[test]
    fn test_absent_tag_and_unmatched_qualifier_resolve_to_none() {
        let table = tokenize(DOC);
        assert_eq!(resolve_field(&table, &rule("N9", 2, None)), None);
        assert_eq!(resolve_field(&table, &rule("REF", 2, Some("PO"))), None);
    }

    #[test]
    fn test_out_of_range_index_and_empty_value_resolve_to_none() {
        let table = tokenize(DOC);
        assert_eq!(resolve_field(&table, &rule("B3", 9, None)), None);
        // B3 element 1 is empty
        assert_eq!(resolve_field(&table, &rule("B3", 1, None)), None);
    }

    #[test]
    fn test_first_of_stops_at_first_resolving_rule() {
        let table = tokenize(DOC);
        let chain = FirstOfRule {
            first_of: vec![rule("B3", 3, None), rule("REF", 2, Some("BM"))],
        };
        assert_eq!(resolve_first_of(&table, &chain), Some("BOL001".to_string()));
    }

    #[test]
    fn test_first_of_falls_through_unresolvable_rules() {
        let table = tokenize("B3**INV001~REF*BM*BOL999~");
        let chain = FirstOfRule {
            first_of: vec![rule("B3", 3, None), rule("REF", 2, Some("BM"))],
        };
        assert_eq!(resolve_first_of(&table, &chain), Some("BOL999".to_string()));
    }

    #[test]
    fn test_first_of_with_no_match_is_none() {
        let table = tokenize("B3**INV001~");
        let chain = FirstOfRule {
            first_of: vec![rule("B3", 3, None), rule("REF", 2, Some("BM"))],
        };
        assert_eq!(resolve_first_of(&table, &chain), None);
    }
}
