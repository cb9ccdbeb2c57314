//! Mock extractor for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::artifact::Artifact;
use crate::extractor::{ArchiveExtractor, ExtractorError, LocalArtifact};

/// Callback run inside `prepare_local_copy`, before it returns.
pub type PrepareHook = Arc<dyn Fn(&Artifact) + Send + Sync>;

/// Mock implementation of the ArchiveExtractor trait.
///
/// By default the local copy is `/local/<stem>.<extension>` with extension `gbk`.
pub struct MockExtractor {
    prepared: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<ExtractorError>>>,
    local_extension: Arc<RwLock<Option<String>>>,
    delay: Arc<RwLock<Duration>>,
    hook: Arc<RwLock<Option<PrepareHook>>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    /// Create a new mock extractor.
    pub fn new() -> Self {
        Self {
            prepared: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            local_extension: Arc::new(RwLock::new(Some("gbk".to_string()))),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            hook: Arc::new(RwLock::new(None)),
        }
    }

    /// Identifiers of artifacts passed to `prepare_local_copy`.
    pub async fn prepared(&self) -> Vec<String> {
        self.prepared.read().await.clone()
    }

    /// Configure the next preparation to fail with the given error.
    pub async fn set_next_error(&self, error: ExtractorError) {
        *self.next_error.write().await = Some(error);
    }

    /// Extension of the local copy; `None` keeps the artifact name.
    pub async fn set_local_extension(&self, extension: Option<&str>) {
        *self.local_extension.write().await = extension.map(str::to_string);
    }

    /// Simulated preparation time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Run `hook` during every preparation.
    pub async fn set_hook(&self, hook: PrepareHook) {
        *self.hook.write().await = Some(hook);
    }
}

#[async_trait]
impl ArchiveExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn prepare_local_copy(
        &self,
        artifact: &Artifact,
    ) -> Result<LocalArtifact, ExtractorError> {
        self.prepared.write().await.push(artifact.id.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(hook) = self.hook.read().await.clone() {
            hook(artifact);
        }
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let id = match self.local_extension.read().await.as_deref() {
            Some(ext) => {
                let stem = std::path::Path::new(&artifact.id)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| artifact.id.clone());
                format!("{}.{}", stem, ext)
            }
            None => artifact.id.clone(),
        };
        Ok(LocalArtifact {
            path: PathBuf::from("/local").join(&id),
            id,
        })
    }
}
