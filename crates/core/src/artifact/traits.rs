//! Trait definitions for the artifact module.

use async_trait::async_trait;

use super::error::SourceError;
use super::types::Artifact;

/// Enumerates the artifacts currently available.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// Lists all artifacts, newest first.
    async fn list(&self) -> Result<Vec<Artifact>, SourceError>;
}
