//! qcpack: part quality control and packing
//!
//! Inspected parts are classified against fixed quality limits. Approved
//! parts are packed into fixed-capacity boxes, rejected ones are kept in a
//! registry, and everything is stored as plain JSON files that are read
//! back on startup.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
