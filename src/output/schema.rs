//! Output JSON schema definitions for GC reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::model::{Event, GcModel, ModelSummary};
use crate::utils::config::REPORT_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Log file (or other source) the model was read from
    pub source: String,

    /// Aggregate statistics
    pub summary: ModelSummary,

    /// Top-level events with their children
    pub events: Vec<Event>,

    /// Timestamp when report was generated
    pub generated_at: String,
}

impl Report {
    /// Build a report from a finished model
    ///
    /// **Public** - used by commands to create final output
    pub fn from_model(source: impl Into<String>, model: &GcModel) -> Self {
        use chrono::Utc;

        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            source: source.into(),
            summary: model.summary(),
            events: model.events().cloned().collect(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}
