//! Trait definitions for the extractor module.

use async_trait::async_trait;

use crate::artifact::Artifact;

use super::error::ExtractorError;
use super::types::LocalArtifact;

/// Turns a source artifact into a local file the restorer can read.
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Ensures a local copy of `artifact` exists and returns it.
    ///
    /// Must succeed without doing any work when the local copy is already present.
    async fn prepare_local_copy(&self, artifact: &Artifact)
        -> Result<LocalArtifact, ExtractorError>;
}
