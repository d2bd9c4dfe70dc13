//! Inventory manager - classify parts, pack approved ones into boxes,
//! keep the rejected registry and produce reports
//!
//! State changes are applied in memory first and then persisted. When a
//! write fails the change stays applied and the caller gets
//! [`InventoryError::Persist`]; the file on disk keeps its previous content
//! because every write is atomic.

use chrono::{DateTime, Local};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::report::{GeneratedReport, ReportSummary};
use crate::core::rules::{QualityRules, Verdict};
use crate::core::store::{SkippedArtifact, Store, StoreError};
use crate::entities::{Item, PartBox};
use crate::schema::template::{ReportRenderer, TemplateError};

#[derive(Debug, Error, Diagnostic)]
pub enum InventoryError {
    #[error("invalid input: {0}")]
    #[diagnostic(code(qcpack::inventory::validation))]
    Validation(String),

    #[error("part #{0} not found")]
    #[diagnostic(
        code(qcpack::inventory::not_found),
        help("run `qcp list` to see registered parts")
    )]
    NotFound(u64),

    #[error("part #{id} is sealed in closed box #{box_number} and cannot be removed")]
    #[diagnostic(
        code(qcpack::inventory::immutable),
        help("closed boxes are never modified")
    )]
    Immutable { id: u64, box_number: u32 },

    #[error("change applied but could not be saved")]
    #[diagnostic(
        code(qcpack::inventory::persist),
        help("the previous file content was kept; check permissions and free space")
    )]
    Persist(#[source] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),
}

/// Where a registered part currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    OpenBox(u32),
    ClosedBox(u32),
    Rejected,
}

/// In-memory inventory state backed by a [`Store`]
pub struct Inventory {
    rules: QualityRules,
    capacity: usize,
    store: Store,
    closed_boxes: Vec<PartBox>,
    open_box: PartBox,
    rejected: Vec<Item>,
    next_id: u64,
    next_box_number: u32,
    skipped: Vec<SkippedArtifact>,
}

impl Inventory {
    /// Load the inventory described by the configuration
    pub fn open(config: &Config) -> Result<Self, InventoryError> {
        Self::load(config.rules(), config.box_capacity, Store::new(&config.data_dir))
    }

    /// Rebuild state from the store
    ///
    /// When no open box exists on disk one is created in memory with the
    /// next free number. An open box that is already at capacity (the
    /// capacity may have been lowered since it was written) is sealed.
    pub fn load(rules: QualityRules, capacity: usize, store: Store) -> Result<Self, InventoryError> {
        if capacity == 0 {
            return Err(InventoryError::Validation(
                "box capacity must be at least 1".to_string(),
            ));
        }

        let loaded = store.load_all()?;
        let next_box_number = loaded.next_box_number;
        let open_box = loaded
            .open_box
            .unwrap_or_else(|| PartBox::new(next_box_number));

        let mut inventory = Self {
            rules,
            capacity,
            store,
            closed_boxes: loaded.closed_boxes,
            next_box_number: next_box_number.max(open_box.number + 1),
            open_box,
            rejected: loaded.rejected,
            next_id: loaded.next_id,
            skipped: loaded.skipped,
        };

        if inventory.open_box.is_full(capacity) {
            tracing::info!(
                box_number = inventory.open_box.number,
                "open box is already full; sealing it"
            );
            inventory.seal_open_box()?;
        }

        Ok(inventory)
    }

    /// Register and classify a new part
    pub fn register(&mut self, weight: f64, length: f64, color: &str) -> Result<Item, InventoryError> {
        if !weight.is_finite() {
            return Err(InventoryError::Validation(format!("weight must be a number, got {}", weight)));
        }
        if !length.is_finite() {
            return Err(InventoryError::Validation(format!("length must be a number, got {}", length)));
        }

        let id = self.next_id;
        self.next_id += 1;

        let item = match self.rules.evaluate(weight, length, color) {
            Verdict::Approved => Item::approved(id, weight, length, color),
            Verdict::Rejected(reasons) => Item::rejected(id, weight, length, color, reasons),
        };

        if item.approved {
            tracing::info!(id, box_number = self.open_box.number, "part approved");
            self.pack(item.clone()).map_err(InventoryError::Persist)?;
        } else {
            tracing::info!(id, reasons = ?item.failure_reasons, "part rejected");
            self.rejected.push(item.clone());
            self.store
                .save_rejected(&self.rejected)
                .map_err(InventoryError::Persist)?;
        }

        Ok(item)
    }

    /// Put an approved part in the open box, sealing it when full
    fn pack(&mut self, item: Item) -> Result<(), StoreError> {
        self.open_box.push(item);
        if self.open_box.is_full(self.capacity) {
            self.seal_open_box()
        } else {
            self.store.save_open_box(&self.open_box).map(|_| ())
        }
    }

    /// Close the open box and start the next one
    fn seal_open_box(&mut self) -> Result<(), StoreError> {
        let next = PartBox::new(self.next_box_number);
        self.next_box_number += 1;

        let mut sealed = std::mem::replace(&mut self.open_box, next);
        sealed.close();
        tracing::info!(box_number = sealed.number, parts = sealed.len(), "box closed");
        self.closed_boxes.push(sealed);

        if let Some(sealed) = self.closed_boxes.last() {
            self.store.save_box(sealed)?;
        }
        self.store.save_open_box(&self.open_box)?;
        Ok(())
    }

    /// Remove a part that is not yet sealed in a closed box
    pub fn remove(&mut self, id: u64) -> Result<Item, InventoryError> {
        if let Some(item) = self.open_box.remove(id) {
            tracing::info!(id, box_number = self.open_box.number, "removed part from open box");
            self.store
                .save_open_box(&self.open_box)
                .map_err(InventoryError::Persist)?;
            return Ok(item);
        }

        if let Some(pos) = self.rejected.iter().position(|i| i.id == id) {
            let item = self.rejected.remove(pos);
            tracing::info!(id, "removed part from rejected registry");
            self.store
                .save_rejected(&self.rejected)
                .map_err(InventoryError::Persist)?;
            return Ok(item);
        }

        match self.closed_boxes.iter().find(|b| b.contains(id)) {
            Some(b) => Err(InventoryError::Immutable {
                id,
                box_number: b.number,
            }),
            None => Err(InventoryError::NotFound(id)),
        }
    }

    /// Approved parts ordered by id
    pub fn list_approved(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .closed_boxes
            .iter()
            .chain(std::iter::once(&self.open_box))
            .flat_map(|b| b.items.iter())
            .collect();
        items.sort_by_key(|i| i.id);
        items
    }

    /// Rejected parts ordered by id
    pub fn list_rejected(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.rejected.iter().collect();
        items.sort_by_key(|i| i.id);
        items
    }

    /// Closed boxes in box-number order
    pub fn list_closed_boxes(&self) -> &[PartBox] {
        &self.closed_boxes
    }

    pub fn open_box(&self) -> &PartBox {
        &self.open_box
    }

    /// Find where a part lives
    pub fn locate(&self, id: u64) -> Option<Location> {
        if self.open_box.contains(id) {
            return Some(Location::OpenBox(self.open_box.number));
        }
        if let Some(b) = self.closed_boxes.iter().find(|b| b.contains(id)) {
            return Some(Location::ClosedBox(b.number));
        }
        if self.rejected.iter().any(|i| i.id == id) {
            return Some(Location::Rejected);
        }
        None
    }

    /// Aggregate counts at the given time
    pub fn summary(&self, at: DateTime<Local>) -> ReportSummary {
        ReportSummary::collect(
            &self.closed_boxes,
            &self.open_box,
            &self.rejected,
            self.capacity,
            at,
        )
    }

    /// Render the summary report and save it under reports/
    pub fn generate_report(&self) -> Result<GeneratedReport, InventoryError> {
        self.generate_report_at(Local::now())
    }

    pub fn generate_report_at(&self, at: DateTime<Local>) -> Result<GeneratedReport, InventoryError> {
        let summary = self.summary(at);
        let text = ReportRenderer::new()?.render_report(&summary)?;
        let path = self.store.save_report(&text, at)?;
        tracing::info!(path = %path.display(), "report generated");
        Ok(GeneratedReport {
            summary,
            text,
            path,
        })
    }

    pub fn rules(&self) -> &QualityRules {
        &self.rules
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Artifacts ignored while loading
    pub fn skipped(&self) -> &[SkippedArtifact] {
        &self.skipped
    }

    /// Identifier the next registered part will get
    #[cfg(test)]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}
