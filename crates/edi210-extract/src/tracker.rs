//! Ordered warning and penalty-event accumulation
//!
//! Diagnostics are collected as an ordered list of human-readable warnings
//! plus an ordered list of penalty events, folded into a single confidence
//! score at assembly. The score starts at 1.0 and is never clamped; the
//! missing-invoice-date path sets it to a fixed 0.1 instead of
//! subtracting. Both behaviors are part of the output contract.

use tracing::debug;

/// Penalty event kinds with fixed effects on the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyKind {
    /// Optional ref/date/party unresolvable.
    SoftFieldMissing,
    /// Invoice date segment unresolvable.
    InvoiceDateMissing,
    /// A combinable charge segment type absent from the document.
    ChargeSegmentMissing,
    /// A charge line matched no bucket rule (one event per distinct code).
    UncategorizedCharge,
    /// Reported total differs from the computed sum.
    TotalMismatch,
    /// No total segment resolvable; computed sum used.
    TotalSegmentMissing,
}

/// How a penalty event acts on the running score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenaltyEffect {
    /// Subtract a fixed weight.
    Deduct(f64),
    /// Set the score to a fixed value.
    Set(f64),
}

impl PenaltyKind {
    /// The fixed effect of this event kind.
    pub fn effect(self) -> PenaltyEffect {
        match self {
            Self::SoftFieldMissing => PenaltyEffect::Deduct(0.05),
            Self::InvoiceDateMissing => PenaltyEffect::Set(0.1),
            Self::ChargeSegmentMissing => PenaltyEffect::Deduct(0.1),
            Self::UncategorizedCharge => PenaltyEffect::Deduct(0.1),
            Self::TotalMismatch => PenaltyEffect::Deduct(0.1),
            Self::TotalSegmentMissing => PenaltyEffect::Deduct(0.15),
        }
    }
}

/// Accumulates warnings and penalty events during one extraction pass.
#[derive(Debug, Default)]
pub struct Tracker {
    warnings: Vec<String>,
    events: Vec<PenaltyKind>,
}

impl Tracker {
    /// Fresh tracker for one parse call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic warning in emission order.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(warning = %message, "extraction warning");
        self.warnings.push(message);
    }

    /// Record a penalty event.
    pub fn penalize(&mut self, kind: PenaltyKind) {
        self.events.push(kind);
    }

    /// Append a warning and record its penalty in one step.
    pub fn warn_and_penalize(&mut self, message: impl Into<String>, kind: PenaltyKind) {
        self.warn(message);
        self.penalize(kind);
    }

    /// Warnings accumulated so far, in emission order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Penalty events accumulated so far, in emission order.
    pub fn events(&self) -> &[PenaltyKind] {
        &self.events
    }

    /// Fold the event list into the final score, starting from 1.0.
    /// Unclamped: heavy penalty accumulation can push the score below 0,
    /// which the schema validator then rejects.
    pub fn confidence(&self) -> f64 {
        self.events.iter().fold(1.0, |score, kind| {
            match kind.effect() {
                PenaltyEffect::Deduct(weight) => score - weight,
                PenaltyEffect::Set(value) => value,
            }
        })
    }

    /// Consume the tracker, yielding the warning list and folded score.
    pub fn into_parts(self) -> (Vec<String>, f64) {
        let confidence = self.confidence();
        (self.warnings, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_untouched_tracker_scores_one() {
        let tracker = Tracker::new();
        assert!(close(tracker.confidence(), 1.0));
        assert!(tracker.warnings().is_empty());
    }

    #[test]
    fn test_soft_field_penalty_deducts_five_hundredths() {
        let mut tracker = Tracker::new();
        tracker.warn_and_penalize("REF not found.", PenaltyKind::SoftFieldMissing);
        assert!(close(tracker.confidence(), 0.95));
        assert_eq!(tracker.warnings(), ["REF not found."]);
    }

    #[test]
    fn test_penalties_accumulate_in_order() {
        let mut tracker = Tracker::new();
        tracker.penalize(PenaltyKind::SoftFieldMissing);
        tracker.penalize(PenaltyKind::UncategorizedCharge);
        tracker.penalize(PenaltyKind::TotalSegmentMissing);
        assert!(close(tracker.confidence(), 1.0 - 0.05 - 0.1 - 0.15));
    }

    #[test]
    fn test_invoice_date_missing_sets_the_score() {
        let mut tracker = Tracker::new();
        tracker.penalize(PenaltyKind::SoftFieldMissing);
        tracker.penalize(PenaltyKind::InvoiceDateMissing);
        // the set overrides everything before it
        assert!(close(tracker.confidence(), 0.1));

        tracker.penalize(PenaltyKind::SoftFieldMissing);
        // and later deductions apply on top of the set value
        assert!(close(tracker.confidence(), 0.05));
    }

    #[test]
    fn test_score_is_not_clamped() {
        let mut tracker = Tracker::new();
        for _ in 0..11 {
            tracker.penalize(PenaltyKind::UncategorizedCharge);
        }
        assert!(tracker.confidence() < 0.0);
    }

    #[test]
    fn test_into_parts_preserves_emission_order() {
        let mut tracker = Tracker::new();
        tracker.warn("first");
        tracker.warn("second");
        let (warnings, confidence) = tracker.into_parts();
        assert_eq!(warnings, ["first", "second"]);
        assert!(close(confidence, 1.0));
    }
}
