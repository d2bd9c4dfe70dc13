//! Core module - rules, storage, inventory state and configuration

pub mod config;
pub mod inventory;
pub mod logging;
pub mod report;
pub mod rules;
pub mod store;

pub use config::{Config, ConfigError};
pub use inventory::{Inventory, InventoryError, Location};
pub use report::{GeneratedReport, ReportSummary};
pub use rules::{QualityRules, Verdict};
pub use store::{LoadedState, SkippedArtifact, Store, StoreError};
