//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, Inventory, QualityRules};
use crate::entities::Item;

/// Load the effective configuration and open the inventory it points at
///
/// Artifacts skipped during loading are reported on stderr unless `--quiet`.
pub fn open_inventory(global: &GlobalOpts) -> Result<Inventory> {
    let config = Config::load(global.data_dir.as_deref())?;
    let inventory = Inventory::open(&config)?;

    if !global.quiet {
        for skipped in inventory.skipped() {
            eprintln!(
                "{} Skipped {}: {}",
                style("!").yellow(),
                skipped.path.display(),
                skipped.reason
            );
        }
    }

    Ok(inventory)
}

/// Parse a measurement typed by a person. Accepts a comma as the decimal
/// separator ("99,5") and rejects values that are not finite numbers.
pub fn parse_measurement(s: &str) -> std::result::Result<f64, String> {
    let normalized = s.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{}' is not a number", s.trim())),
    }
}

/// Rejection reasons with the limits they refer to, joined for display
pub fn describe_reasons(item: &Item, rules: &QualityRules) -> String {
    item.failure_reasons
        .iter()
        .map(|r| rules.describe(*r))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format a measurement without trailing zeros ("100", "99.5")
pub fn format_measurement(v: f64) -> String {
    format!("{}", v)
}
