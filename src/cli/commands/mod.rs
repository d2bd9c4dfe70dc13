//! CLI command implementations

pub mod boxes;
pub mod completions;
pub mod config;
pub mod list;
pub mod menu;
pub mod register;
pub mod remove;
pub mod report;
