//! Directory-backed artifact source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use super::config::SourceConfig;
use super::error::SourceError;
use super::traits::ArtifactSource;
use super::types::{sort_newest_first, Artifact};

/// Lists matching files in a single directory (non-recursive).
pub struct DirArtifactSource {
    config: SourceConfig,
}

impl DirArtifactSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ArtifactSource for DirArtifactSource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn list(&self) -> Result<Vec<Artifact>, SourceError> {
        let dir = &self.config.dir;
        let mut entries = fs::read_dir(dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::DirectoryNotFound { path: dir.clone() }
            } else {
                SourceError::ReadFailed {
                    path: dir.clone(),
                    source: e,
                }
            }
        })?;

        let mut artifacts = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(SourceError::ReadFailed {
                        path: dir.clone(),
                        source: e,
                    })
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !self.config.matches(&name) {
                continue;
            }

            // Entries can vanish between listing and stat while the producer rotates files.
            let Ok(meta) = entry.metadata().await else {
                debug!("Skipping unreadable artifact entry {}", name);
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let modified = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

            artifacts.push(Artifact::new(entry.path(), modified));
        }

        sort_newest_first(&mut artifacts);
        debug!("Found {} artifacts in {}", artifacts.len(), dir.display());
        Ok(artifacts)
    }
}
