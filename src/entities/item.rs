//! Item entity - a single inspected part

use serde::{Deserialize, Serialize};

/// Why a part failed inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    WeightOutOfRange,
    LengthOutOfRange,
    ColorNotAllowed,
}

impl RejectionReason {
    /// All reasons, in the order they are evaluated and reported
    pub fn all() -> &'static [RejectionReason] {
        &[
            RejectionReason::WeightOutOfRange,
            RejectionReason::LengthOutOfRange,
            RejectionReason::ColorNotAllowed,
        ]
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::WeightOutOfRange => write!(f, "weight out of range"),
            RejectionReason::LengthOutOfRange => write!(f, "length out of range"),
            RejectionReason::ColorNotAllowed => write!(f, "color not allowed"),
        }
    }
}

/// A single inspected part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Sequential identifier. New ids start above the highest id on disk.
    pub id: u64,

    /// Weight in grams
    pub weight: f64,

    /// Length in centimeters
    pub length: f64,

    /// Normalized color (trimmed, lower case)
    pub color: String,

    /// Whether the part passed inspection
    #[serde(default)]
    pub approved: bool,

    /// Violated rules, empty when approved
    #[serde(default)]
    pub failure_reasons: Vec<RejectionReason>,
}

impl Item {
    /// Build an approved part
    pub fn approved(id: u64, weight: f64, length: f64, color: &str) -> Self {
        Self {
            id,
            weight,
            length,
            color: normalize_color(color),
            approved: true,
            failure_reasons: Vec::new(),
        }
    }

    /// Build a rejected part with the rules it violated
    pub fn rejected(
        id: u64,
        weight: f64,
        length: f64,
        color: &str,
        reasons: Vec<RejectionReason>,
    ) -> Self {
        Self {
            id,
            weight,
            length,
            color: normalize_color(color),
            approved: false,
            failure_reasons: reasons,
        }
    }

    /// Human-readable status, e.g. "approved" or "rejected (weight out of range)"
    pub fn status_label(&self) -> String {
        if self.approved {
            "approved".to_string()
        } else {
            let reasons: Vec<String> = self.failure_reasons.iter().map(|r| r.to_string()).collect();
            format!("rejected ({})", reasons.join("; "))
        }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} | {}g | {} | {}cm | {}",
            self.id,
            self.weight,
            self.color,
            self.length,
            self.status_label()
        )
    }
}

/// Colors are compared case-insensitively, ignoring surrounding whitespace
pub fn normalize_color(color: &str) -> String {
    color.trim().to_lowercase()
}
