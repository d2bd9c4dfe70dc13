//! Quality rules - accept or reject a part from its measurements

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::entities::item::{normalize_color, RejectionReason};

/// Outcome of inspecting a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    /// Violated rules in evaluation order: weight, length, color
    Rejected(Vec<RejectionReason>),
}

/// Acceptance limits for inspected parts. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityRules {
    weight: RangeInclusive<f64>,
    length: RangeInclusive<f64>,
    colors: BTreeSet<String>,
}

impl QualityRules {
    pub fn new(
        weight: RangeInclusive<f64>,
        length: RangeInclusive<f64>,
        colors: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            weight,
            length,
            colors: colors.into_iter().map(|c| normalize_color(&c)).collect(),
        }
    }

    pub fn weight_range(&self) -> &RangeInclusive<f64> {
        &self.weight
    }

    pub fn length_range(&self) -> &RangeInclusive<f64> {
        &self.length
    }

    pub fn allowed_colors(&self) -> &BTreeSet<String> {
        &self.colors
    }

    /// Inspect a part. NaN measurements fall outside every range.
    pub fn evaluate(&self, weight: f64, length: f64, color: &str) -> Verdict {
        let mut reasons = Vec::new();
        if !self.weight.contains(&weight) {
            reasons.push(RejectionReason::WeightOutOfRange);
        }
        if !self.length.contains(&length) {
            reasons.push(RejectionReason::LengthOutOfRange);
        }
        if !self.colors.contains(&normalize_color(color)) {
            reasons.push(RejectionReason::ColorNotAllowed);
        }

        if reasons.is_empty() {
            Verdict::Approved
        } else {
            Verdict::Rejected(reasons)
        }
    }

    /// Describe a reason together with the limit it refers to
    pub fn describe(&self, reason: RejectionReason) -> String {
        match reason {
            RejectionReason::WeightOutOfRange => format!(
                "{} (accepted {}-{} g)",
                reason,
                self.weight.start(),
                self.weight.end()
            ),
            RejectionReason::LengthOutOfRange => format!(
                "{} (accepted {}-{} cm)",
                reason,
                self.length.start(),
                self.length.end()
            ),
            RejectionReason::ColorNotAllowed => {
                let colors: Vec<&str> = self.colors.iter().map(String::as_str).collect();
                format!("{} (accepted {})", reason, colors.join(", "))
            }
        }
    }
}
