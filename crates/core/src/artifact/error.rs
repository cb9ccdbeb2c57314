//! Error types for the artifact module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while enumerating artifacts.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The artifact directory does not exist.
    #[error("Artifact directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// The artifact directory could not be listed.
    #[error("Failed to read artifact directory {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
