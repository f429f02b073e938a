//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! Readers never fail a parse. Everything they cannot understand is recorded
//! as a [`ReaderWarning`] and logged, and parsing carries on.

use thiserror::Error;

/// Errors returned by the shared text parsing utilities
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unparseable date: '{text}'")]
    DateParse { text: String },

    #[error("Invalid number: '{text}'")]
    NumberFormat { text: String },
}

/// Classification of a reader warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// Timestamp text matched neither known format
    DateParse,
    /// A field expected to be numeric was not
    NumberFormat,
    /// Unknown element, missing attribute, or close without open
    Structural,
    /// A finalized record did not carry the expected classification
    Consistency,
}

/// A recoverable problem found while reading a log
///
/// The `Display` text is what gets written to the log.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReaderWarning {
    #[error("Unparseable timestamp '{text}' in element: {element}")]
    DateParse { element: String, text: String },

    #[error("Error parsing number '{value}' for '{attribute}' in element: {element}")]
    NumberFormat {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("Unhandled element: {element}")]
    UnexpectedElement { element: String },

    #[error("Missing attribute '{attribute}' in element: {element}")]
    MissingAttribute { element: String, attribute: String },

    #[error("Found end <{element}> tag with no begin tag")]
    UnmatchedClose { element: String },

    #[error("Abandoned unfinished GC cycle {gc_id:?} at line {line}")]
    AbandonedCycle { gc_id: Option<u64>, line: usize },

    #[error("Unhandled AF type: {af_type:?}")]
    UnexpectedAfType { af_type: Option<String> },

    #[error("Different GC type: {gc_type:?}")]
    UnexpectedGcType { gc_type: Option<String> },
}

impl ReaderWarning {
    /// Which of the four warning classes this belongs to
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::DateParse { .. } => WarningKind::DateParse,
            Self::NumberFormat { .. } => WarningKind::NumberFormat,
            Self::UnexpectedElement { .. }
            | Self::MissingAttribute { .. }
            | Self::UnmatchedClose { .. }
            | Self::AbandonedCycle { .. } => WarningKind::Structural,
            Self::UnexpectedAfType { .. } | Self::UnexpectedGcType { .. } => {
                WarningKind::Consistency
            }
        }
    }
}

/// Errors that can occur during report output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_kinds() {
        let unmatched = ReaderWarning::UnmatchedClose {
            element: "af".to_string(),
        };
        assert_eq!(unmatched.kind(), WarningKind::Structural);
        assert_eq!(
            unmatched.to_string(),
            "Found end <af> tag with no begin tag"
        );

        let gc_type = ReaderWarning::UnexpectedGcType {
            gc_type: Some("scavenge".to_string()),
        };
        assert_eq!(gc_type.kind(), WarningKind::Consistency);
    }
}
