//! Append-only text file tracker.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::config::TrackerConfig;
use super::error::TrackerError;
use super::traits::ArtifactTracker;
use super::types::ProcessedSet;

/// Tracks processed artifacts in a text file, one identifier per line.
///
/// The file is re-read on every query so edits made by an operator between runs
/// are picked up. Blank lines and duplicates are ignored.
pub struct FileArtifactTracker {
    path: PathBuf,
}

impl FileArtifactTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_path(config.path.clone())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactTracker for FileArtifactTracker {
    fn list_processed(&self) -> Result<ProcessedSet, TrackerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProcessedSet::new()),
            Err(e) => {
                return Err(TrackerError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// Any failure here, including reading the record first, is a persistence failure.
    fn mark_processed(&self, id: &str) -> Result<(), TrackerError> {
        let recorded = match self.is_processed(id) {
            Ok(recorded) => recorded,
            Err(TrackerError::Read { path, source }) => {
                return Err(TrackerError::Persistence { path, source })
            }
            Err(e) => return Err(e),
        };
        if recorded {
            debug!("Artifact {} already recorded", id);
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TrackerError::persistence(&self.path, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TrackerError::persistence(&self.path, e))?;
        writeln!(file, "{}", id).map_err(|e| TrackerError::persistence(&self.path, e))?;
        file.sync_all()
            .map_err(|e| TrackerError::persistence(&self.path, e))?;

        info!(artifact = id, "Recorded artifact as processed");
        Ok(())
    }
}
