//! Parser-specific error types.

use crate::types::RecordKind;
use thiserror::Error;

/// Why a line did not become a record.
///
/// Every variant is recoverable: the driver logs it, drops the line and
/// moves on to the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No section marker matched
    #[error("Unrecognized line")]
    Unrecognized,

    #[error("Expected at least {expected} tab-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Line does not match the {kind} pattern")]
    PatternMismatch { kind: RecordKind },

    #[error("Invalid number {text:?}")]
    NumberFormat { text: String },
}

impl ParseError {
    /// Whether this is a classification miss rather than an extraction failure
    pub fn is_classification_miss(&self) -> bool {
        matches!(self, ParseError::Unrecognized)
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
