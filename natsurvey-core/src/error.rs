//! Error types for NatSurvey operations.
//!
//! File-level failures (unreadable input, I/O) are represented by
//! [`NatSurveyError`]. Failures of a single quality check are a separate,
//! smaller [`CheckError`] so the profiler can turn them into report warnings
//! without ever aborting the rest of a file's analysis.

use std::path::Path;

use thiserror::Error;

/// Main error type for NatSurvey operations.
#[derive(Debug, Error)]
pub enum NatSurveyError {
    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Tabular parse failure for one read configuration
    #[error("Parse failed: {context}")]
    Parse { context: String },

    /// No read configuration could parse the file
    #[error("Unreadable file {path}: no read configuration succeeded ({attempts} attempts)")]
    Unreadable { path: String, attempts: usize },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Internal data invariant was violated
    #[error("Invariant violated: {message}")]
    Invariant { message: String },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with `NatSurveyError`
pub type Result<T> = std::result::Result<T, NatSurveyError>;

impl NatSurveyError {
    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a parse error
    pub fn parse(context: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
        }
    }

    /// Creates an unreadable-file error
    pub fn unreadable(path: &Path, attempts: usize) -> Self {
        Self::Unreadable {
            path: path.display().to_string(),
            attempts,
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

/// Failure of one quality check on one file.
///
/// Never propagated out of a file's analysis: the profiler records it as a
/// warning and reports zeroed or absent metrics for that check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The check's required column is absent from the table
    #[error("column '{column}' not present")]
    ColumnMissing { column: String },

    /// A range check was asked to compare a non-numeric column
    #[error("column '{column}' is not numeric (resolved as {found})")]
    ColumnNotNumeric { column: String, found: String },
}
