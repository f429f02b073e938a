//! The uniform GC event model every reader produces.
//!
//! This module provides:
//! - Event kinds, categories and generations
//! - Running statistics
//! - The ordered model with its aggregate queries

pub mod event;
pub mod gc_model;
pub mod stats;

// Re-export main types
pub use event::{Category, Event, EventKind, Generation};
pub use gc_model::{CategoryStats, CategorySummary, GcModel, ModelSummary};
pub use stats::Stats;
