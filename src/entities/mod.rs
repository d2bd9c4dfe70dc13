//! Entity type definitions
//!
//! - [`Item`] - a single inspected part with its verdict
//! - [`PartBox`] - a capacity-bounded box of approved parts

pub mod item;
pub mod part_box;

pub use item::{Item, RejectionReason};
pub use part_box::PartBox;
