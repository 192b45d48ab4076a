//! Error types for the scan engine
//!
//! Expected failures of external commands never surface here: they are
//! recorded as failed tasks in the scan log. Only fatal preconditions and
//! unexpected I/O problems abort a scan.

use deepscan_core::domain::options::OptionsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors that abort a scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// Required tools are not installed or the container runtime is down
    #[error("missing dependencies: {0}")]
    MissingDependencies(String),

    /// Scan options failed validation
    #[error("invalid scan options: {0}")]
    InvalidOptions(#[from] OptionsError),

    /// Filesystem operation failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A directory tree would be copied into one of its own subdirectories
    #[error("cannot copy {} to a subdirectory of itself: {}", .from.display(), .to.display())]
    CopyIntoSelf { from: PathBuf, to: PathBuf },

    /// The manifest template is not valid JSON
    #[error("invalid manifest template: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The manifest template parsed but has an unexpected structure
    #[error("invalid manifest template: {0}")]
    ManifestShape(&'static str),
}

impl ScanError {
    /// Wraps an I/O error with a description of the failed operation
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the error is a failed precondition check
    pub fn is_missing_dependencies(&self) -> bool {
        matches!(self, Self::MissingDependencies(_))
    }
}
