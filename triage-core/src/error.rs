//! Triage error types
//!
//! Only report ingestion and output writing can fail. The reconstruction engine
//! itself has no error class: a missing file or an unmatched pattern degrades to
//! a smaller result instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for triage operations
pub type TriageResult<T> = Result<T, TriageError>;

/// Errors raised while ingesting reports or writing output documents
#[derive(Error, Debug)]
pub enum TriageError {
    /// The Surefire reports directory does not exist
    #[error("Reports directory '{path}' not found")]
    ReportsDirNotFound { path: PathBuf },

    /// The reports directory holds no `TEST-*.xml` files
    #[error("No XML test reports found in {path}")]
    NoReports { path: PathBuf },

    /// A single report file could not be parsed
    #[error("Could not parse {path}: {message}")]
    MalformedReport { path: PathBuf, message: String },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TriageError {
    /// Create a malformed report error
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedReport {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether processing of the remaining inputs may continue after this error.
    ///
    /// A malformed report only loses that one file; a missing directory or an
    /// empty report set leaves nothing to analyze.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MalformedReport { .. })
    }

    /// Get recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ReportsDirNotFound { .. } | Self::NoReports { .. } => {
                Some("Run 'mvn test' first to generate test reports")
            }
            Self::MalformedReport { .. } => {
                Some("Re-run the test suite; the report may have been truncated mid-write")
            }
            Self::Io(_) | Self::Json(_) => None,
        }
    }
}
