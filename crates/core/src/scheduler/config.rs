//! Configuration for the scheduler.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Timing of the background loop and its control operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Start the loop when the process starts.
    #[serde(default = "default_autostart")]
    pub autostart: bool,

    /// Minutes between the end of one run and the start of the next.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,

    /// Wait after a failed run, used instead of the interval.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Sleep slice; bounds how late interval changes are noticed.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// How long stop and restart wait for the loop before aborting it.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    /// How long exit waits for an in-flight run before abandoning it.
    #[serde(default = "default_exit_grace_ms")]
    pub exit_grace_ms: u64,

    /// Number of recent runs kept in memory.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// File that keeps interval changes across restarts.
    ///
    /// Written on every `set_interval` and merged over the rest of the
    /// configuration at load time. Changes are kept in memory only when unset.
    #[serde(default)]
    pub interval_file: Option<PathBuf>,
}

fn default_autostart() -> bool {
    true
}

fn default_interval_minutes() -> u32 {
    60
}

fn default_error_backoff_secs() -> u64 {
    60
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_stop_timeout_ms() -> u64 {
    5000
}

fn default_exit_grace_ms() -> u64 {
    5000
}

fn default_history_size() -> usize {
    20
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            autostart: default_autostart(),
            interval_minutes: default_interval_minutes(),
            error_backoff_secs: default_error_backoff_secs(),
            tick_ms: default_tick_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
            exit_grace_ms: default_exit_grace_ms(),
            history_size: default_history_size(),
            interval_file: None,
        }
    }
}

impl SchedulerConfig {
    /// Set the initial interval.
    pub fn with_interval_minutes(mut self, minutes: u32) -> Self {
        self.interval_minutes = minutes;
        self
    }

    /// Set the error back-off.
    pub fn with_error_backoff_secs(mut self, secs: u64) -> Self {
        self.error_backoff_secs = secs;
        self
    }

    /// Persist interval changes to `path`.
    pub fn with_interval_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.interval_file = Some(path.into());
        self
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }
}
