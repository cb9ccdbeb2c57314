//! Extractor types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A backup file ready to be handed to the restorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalArtifact {
    /// File name of the prepared copy.
    pub id: String,
    pub path: PathBuf,
}

impl LocalArtifact {
    pub fn new(path: PathBuf) -> Self {
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { id, path }
    }
}
