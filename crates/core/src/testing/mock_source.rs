//! Mock artifact source for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::artifact::{sort_newest_first, Artifact, ArtifactSource, SourceError};

/// Mock implementation of the ArtifactSource trait.
///
/// Returns a configurable artifact list, sorted newest first like a real source.
#[derive(Debug)]
pub struct MockArtifactSource {
    artifacts: Arc<RwLock<Vec<Artifact>>>,
    /// If set, the next listing will fail with this error.
    next_error: Arc<RwLock<Option<SourceError>>>,
    list_calls: AtomicU32,
}

impl Default for MockArtifactSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockArtifactSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            artifacts: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            list_calls: AtomicU32::new(0),
        }
    }

    /// Create a mock source holding `artifacts`.
    pub fn with_artifacts(artifacts: Vec<Artifact>) -> Self {
        Self {
            artifacts: Arc::new(RwLock::new(artifacts)),
            ..Self::new()
        }
    }

    /// Replace the artifact list.
    pub async fn set_artifacts(&self, artifacts: Vec<Artifact>) {
        *self.artifacts.write().await = artifacts;
    }

    /// Add one artifact, as if the backup job dropped a new file.
    pub async fn add_artifact(&self, artifact: Artifact) {
        self.artifacts.write().await.push(artifact);
    }

    /// Configure the next listing to fail with the given error.
    pub async fn set_next_error(&self, error: SourceError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of times `list` was called.
    pub fn list_count(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactSource for MockArtifactSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list(&self) -> Result<Vec<Artifact>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        let mut artifacts = self.artifacts.read().await.clone();
        sort_newest_first(&mut artifacts);
        Ok(artifacts)
    }
}
