//! Scheduler state and errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::RunOutcome;

/// Errors returned by scheduler control operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// An argument was out of range. Nothing was changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `start` was called while the loop is running.
    #[error("scheduler is already running")]
    AlreadyRunning,

    /// The scheduler has exited and accepts no further commands.
    #[error("scheduler has exited")]
    Terminated,
}

/// Lifecycle of the background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatus {
    /// No loop running.
    #[default]
    Idle,
    /// Loop running, either sleeping or inside a pipeline run.
    Running,
    /// A stop was requested and the loop is winding down.
    Stopping,
    /// Exited. Terminal.
    Stopped,
}

impl SchedulerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

/// Snapshot of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub status: SchedulerStatus,
    /// Minutes between runs. Always positive.
    pub interval_minutes: u32,
    /// When the last run finished.
    pub last_run_at: Option<DateTime<Utc>>,
    /// When the next run is due, while the loop is sleeping.
    pub next_run_at: Option<DateTime<Utc>>,
    /// Reason of the last run's failure, cleared by the next success.
    pub last_error: Option<String>,
    pub last_outcome: Option<RunOutcome>,
    /// A pipeline run is executing right now.
    pub run_in_progress: bool,
    /// Runs completed since the process started.
    pub runs_completed: u64,
}

impl SchedulerState {
    pub fn new(interval_minutes: u32) -> Self {
        Self {
            status: SchedulerStatus::Idle,
            interval_minutes,
            last_run_at: None,
            next_run_at: None,
            last_error: None,
            last_outcome: None,
            run_in_progress: false,
            runs_completed: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SchedulerStatus::Running
    }
}
