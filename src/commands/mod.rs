//! CLI command implementations.
//!
//! Commands orchestrate the readers, the model and the report writer.

pub mod analyze;

// Re-export main command functions
pub use analyze::{execute_analyze, text_summary, validate_args, AnalyzeArgs};
