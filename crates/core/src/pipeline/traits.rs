//! Trait definitions for the pipeline module.

use async_trait::async_trait;

use super::types::PipelineRun;

/// One end-to-end attempt at processing the next artifact.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Runs once. Failures are reported in the returned run, never raised.
    async fn run_once(&self) -> PipelineRun;
}
