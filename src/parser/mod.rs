//! GC log readers.
//!
//! This module handles:
//! - Tolerant number and timestamp parsing
//! - IBM J9 verbose GC (tag stream)
//! - OpenJDK unified logging for ZGC (line stream)
//!
//! The caller picks the reader; formats are never guessed.

pub mod ibm_j9;
pub mod text;
pub mod unified_zgc;

// Re-export main types
pub use ibm_j9::{Attributes, IbmJ9Reader, TagEvent};
pub use text::{parse_double, parse_long, DateFormat, ElapsedClock, TimestampParser};
pub use unified_zgc::UnifiedZgcReader;
