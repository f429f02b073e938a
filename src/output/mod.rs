//! Output writers for GC reports.
//!
//! This module handles writing data to disk:
//! - JSON reports (model summary plus events)

pub mod json;
pub mod schema;

// Re-export main functions
pub use json::write_report;
pub use schema::Report;
