//! Configuration for the pipeline runner.

use serde::{Deserialize, Serialize};

/// Retry behaviour around a busy working database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum removal attempts before the run fails as busy.
    #[serde(default = "default_busy_retry_attempts")]
    pub busy_retry_attempts: u32,

    /// Wait after forcing a disconnect before the next removal attempt.
    #[serde(default = "default_busy_retry_grace_ms")]
    pub busy_retry_grace_ms: u64,
}

fn default_busy_retry_attempts() -> u32 {
    3
}

fn default_busy_retry_grace_ms() -> u64 {
    2000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            busy_retry_attempts: default_busy_retry_attempts(),
            busy_retry_grace_ms: default_busy_retry_grace_ms(),
        }
    }
}

impl PipelineConfig {
    /// Set the removal attempt bound.
    pub fn with_busy_retry_attempts(mut self, attempts: u32) -> Self {
        self.busy_retry_attempts = attempts;
        self
    }

    /// Set the grace wait between removal attempts.
    pub fn with_busy_retry_grace_ms(mut self, ms: u64) -> Self {
        self.busy_retry_grace_ms = ms;
        self
    }
}
