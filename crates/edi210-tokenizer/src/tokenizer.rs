//! Delimiter-based tokenization and transaction-set batching

use tracing::trace;

use crate::segment::{Segment, SegmentTable};
use crate::{ELEMENT_DELIMITER, SEGMENT_DELIMITER};

/// Tokenize raw EDI 210 text into a segment table.
///
/// Newlines are stripped first, then the text is split on the segment
/// delimiter and each chunk on the element delimiter. Empty or
/// delimiter-free input yields a degenerate single-entry table; required
/// segment checks downstream are the enforcement point.
pub fn tokenize(text: &str) -> SegmentTable {
    let mut table = SegmentTable::new();
    for segment in split_segments(text) {
        table.push(segment);
    }
    trace!(
        tags = table.tag_count(),
        segments = table.segment_count(),
        "tokenized document"
    );
    table
}

/// Tokenize an interchange that may carry multiple transaction sets.
///
/// The raw segment sequence is split at each `ST` segment. Every batch is
/// tokenized together with the shared envelope (everything before the
/// first `ST`, conventionally ISA/GS), so each table sees ISA/GS plus its
/// own ST..SE content. A document with no `ST` yields one table of the
/// whole input.
pub fn tokenize_transaction_sets(text: &str) -> Vec<SegmentTable> {
    let segments = split_segments(text);
    let st_positions: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.tag() == "ST")
        .map(|(i, _)| i)
        .collect();

    if st_positions.is_empty() {
        let mut table = SegmentTable::new();
        for segment in segments {
            table.push(segment);
        }
        return vec![table];
    }

    let envelope = &segments[..st_positions[0]];
    let mut tables = Vec::with_capacity(st_positions.len());
    for (batch, &start) in st_positions.iter().enumerate() {
        let end = st_positions
            .get(batch + 1)
            .copied()
            .unwrap_or(segments.len());
        let mut table = SegmentTable::new();
        for segment in envelope.iter().chain(&segments[start..end]) {
            table.push(segment.clone());
        }
        trace!(batch, segments = table.segment_count(), "tokenized batch");
        tables.push(table);
    }
    tables
}

fn split_segments(text: &str) -> Vec<Segment> {
    let flat: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let mut segments: Vec<Segment> = flat
        .trim()
        .split(SEGMENT_DELIMITER)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            Segment::new(
                chunk
                    .split(ELEMENT_DELIMITER)
                    .map(str::to_string)
                    .collect(),
            )
        })
        .collect();
    // A fully empty document still produces one degenerate entry.
    if segments.is_empty() {
        segments.push(Segment::new(vec![String::new()]));
    }
    segments
}
