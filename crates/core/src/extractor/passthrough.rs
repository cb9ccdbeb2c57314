//! Extractor for sources that already hold restorable backups.

use async_trait::async_trait;
use tokio::fs;

use crate::artifact::Artifact;

use super::error::ExtractorError;
use super::traits::ArchiveExtractor;
use super::types::LocalArtifact;

/// Hands the source file to the restorer unchanged.
#[derive(Debug, Default)]
pub struct PassthroughExtractor;

impl PassthroughExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchiveExtractor for PassthroughExtractor {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn prepare_local_copy(
        &self,
        artifact: &Artifact,
    ) -> Result<LocalArtifact, ExtractorError> {
        if !fs::try_exists(&artifact.path).await? {
            return Err(ExtractorError::ArtifactNotFound {
                path: artifact.path.clone(),
            });
        }
        Ok(LocalArtifact {
            id: artifact.id.clone(),
            path: artifact.path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_returns_source_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bck-2024-01-01.gbk");
        std::fs::write(&path, b"backup").unwrap();

        let artifact = Artifact::new(path.clone(), Utc::now());
        let local = PassthroughExtractor::new()
            .prepare_local_copy(&artifact)
            .await
            .unwrap();
        assert_eq!(local.id, "bck-2024-01-01.gbk");
        assert_eq!(local.path, path);
    }

    #[tokio::test]
    async fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let artifact = Artifact::new(dir.path().join("gone.gbk"), Utc::now());
        let err = PassthroughExtractor::new()
            .prepare_local_copy(&artifact)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractorError::ArtifactNotFound { .. }));
    }
}
