//! Box entity - a capacity-bounded, append-only container of approved parts

use serde::{Deserialize, Serialize};

use crate::entities::item::Item;

/// Current on-disk version of box artifacts
pub const BOX_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    BOX_SCHEMA_VERSION
}

/// A box of approved parts
///
/// A box is open while it accepts parts. Once it reaches capacity it is
/// closed and never reopened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartBox {
    /// On-disk format version (absent in older files, read as 1)
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Sequential box number, starting at 1
    pub number: u32,

    /// Whether the box is sealed
    #[serde(default)]
    pub closed: bool,

    /// Parts in insertion order
    #[serde(default)]
    pub items: Vec<Item>,
}

impl PartBox {
    /// Create an empty open box
    pub fn new(number: u32) -> Self {
        Self {
            schema_version: BOX_SCHEMA_VERSION,
            number,
            closed: false,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the box holds `capacity` parts or more
    pub fn is_full(&self, capacity: usize) -> bool {
        self.items.len() >= capacity
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Append a part. Closed boxes are immutable, so this is a no-op returning false on them.
    pub fn push(&mut self, item: Item) -> bool {
        if self.closed {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove a part from an open box
    pub fn remove(&mut self, id: u64) -> Option<Item> {
        if self.closed {
            return None;
        }
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Seal the box
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Part ids in insertion order
    pub fn item_ids(&self) -> Vec<u64> {
        self.items.iter().map(|i| i.id).collect()
    }

    /// Fill level as "n/capacity"
    pub fn fill_label(&self, capacity: usize) -> String {
        format!("{}/{}", self.items.len(), capacity)
    }
}

impl std::fmt::Display for PartBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.closed { "closed" } else { "open" };
        write!(f, "Box #{} ({}, {} part(s))", self.number, status, self.items.len())
    }
}
