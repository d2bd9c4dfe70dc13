//! Report aggregation - counts and fill levels for the summary report

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

use crate::entities::{Item, PartBox, RejectionReason};

/// How often one rejection reason occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason: RejectionReason,
    pub label: String,
    pub count: usize,
}

/// Snapshot of aggregate counts, ready to be rendered
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    #[serde(skip)]
    pub timestamp: DateTime<Local>,
    pub generated_at: String,
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Only reasons that occurred, in evaluation order
    pub rejection_reasons: Vec<ReasonCount>,
    pub closed_boxes: usize,
    pub open_box_number: u32,
    pub open_box_count: usize,
    pub open_box_fill: String,
    /// Comma-separated ids of the parts in the open box
    pub open_box_ids: String,
    pub headline: String,
}

impl ReportSummary {
    pub fn collect(
        closed_boxes: &[PartBox],
        open_box: &PartBox,
        rejected: &[Item],
        capacity: usize,
        timestamp: DateTime<Local>,
    ) -> Self {
        let approved = closed_boxes.iter().map(PartBox::len).sum::<usize>() + open_box.len();

        let rejection_reasons = RejectionReason::all()
            .iter()
            .map(|reason| ReasonCount {
                reason: *reason,
                label: reason.to_string(),
                count: rejected
                    .iter()
                    .filter(|item| item.failure_reasons.contains(reason))
                    .count(),
            })
            .filter(|rc| rc.count > 0)
            .collect();

        let open_box_ids = open_box
            .item_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            timestamp,
            generated_at: timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            total: approved + rejected.len(),
            approved,
            rejected: rejected.len(),
            rejection_reasons,
            closed_boxes: closed_boxes.len(),
            open_box_number: open_box.number,
            open_box_count: open_box.len(),
            open_box_fill: open_box.fill_label(capacity),
            open_box_ids,
            headline: headline(approved, rejected.len(), closed_boxes.len()),
        }
    }
}

/// One-line summary, e.g. "10 approved, 0 rejected, 1 closed box"
pub fn headline(approved: usize, rejected: usize, closed_boxes: usize) -> String {
    let noun = if closed_boxes == 1 { "box" } else { "boxes" };
    format!(
        "{} approved, {} rejected, {} closed {}",
        approved, rejected, closed_boxes, noun
    )
}

/// A rendered and saved report
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub summary: ReportSummary,
    pub text: String,
    pub path: PathBuf,
}
