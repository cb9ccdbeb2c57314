//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::process::ProcessError;

/// Errors raised while preparing a local copy of an artifact.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The source artifact is gone.
    #[error("Artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },

    /// The extraction tool could not be run.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The extraction tool exited with a failure.
    #[error("7z exited with code {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    /// Extraction succeeded but produced no usable backup file.
    #[error("Extraction of {artifact} produced no {extension} file")]
    MissingOutput { artifact: String, extension: String },

    /// Failed to move an extracted file into place.
    #[error("Failed to move {from} to {to}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Creates a move failed error.
    pub fn move_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed { from, to, error }
    }
}
