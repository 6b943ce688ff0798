//! Error types for Probspace.
//!
//! All errors here are local validation failures on malformed input; the
//! engine itself is a pure function, so nothing is transient or retryable.
//! Errors carry stable codes for machine parsing and a category for
//! grouping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::ValueKind;

/// Result type alias for Probspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Value normalization and comparison errors.
    Value,
    /// Filter predicate evaluation errors.
    Filter,
    /// Sample space structure errors.
    Space,
    /// Serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Value => write!(f, "value"),
            ErrorCategory::Filter => write!(f, "filter"),
            ErrorCategory::Space => write!(f, "space"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Probspace.
#[derive(Error, Debug)]
pub enum Error {
    // Value errors (10-19)
    #[error("cannot order {left} against {right}")]
    InvalidComparison { left: ValueKind, right: ValueKind },

    // Filter errors (20-29)
    #[error("operator {comparator} requires a single-valued operand, got {len} values")]
    InvalidFilterOperand { comparator: String, len: usize },

    // Space errors (30-39)
    #[error("unknown event: {name}")]
    UnknownEvent { name: String },

    #[error("duplicate event name: {name}")]
    DuplicateEvent { name: String },

    #[error("too many events: {count} exceeds the {max}-event membership mask")]
    TooManyEvents { count: usize, max: usize },

    // I/O errors (60-69)
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Value errors
    /// - 20-29: Filter errors
    /// - 30-39: Space errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidComparison { .. } => 10,
            Error::InvalidFilterOperand { .. } => 20,
            Error::UnknownEvent { .. } => 30,
            Error::DuplicateEvent { .. } => 31,
            Error::TooManyEvents { .. } => 32,
            Error::Json(_) => 60,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidComparison { .. } => ErrorCategory::Value,
            Error::InvalidFilterOperand { .. } => ErrorCategory::Filter,
            Error::UnknownEvent { .. }
            | Error::DuplicateEvent { .. }
            | Error::TooManyEvents { .. } => ErrorCategory::Space,
            Error::Json(_) => ErrorCategory::Io,
        }
    }
}
