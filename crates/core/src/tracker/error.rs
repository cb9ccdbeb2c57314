//! Error types for the tracker module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by an artifact tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The artifact source returned no candidates at all.
    #[error("No artifacts available")]
    NoArtifactsAvailable,

    /// The processed record exists but could not be read.
    #[error("Failed to read processed record {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The processed record could not be written.
    #[error("Failed to persist processed record {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Creates a persistence error.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
