//! Status update types.

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerState;

use super::format::status_text;

/// Coarse health shown to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Normal,
    Running,
    Error,
}

/// A state change pushed to reporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub level: StatusLevel,
    /// Human-readable summary.
    pub text: String,
    pub state: SchedulerState,
}

impl StatusUpdate {
    /// Derives level and text from a state snapshot.
    pub fn from_state(state: SchedulerState) -> Self {
        let level = if state.run_in_progress {
            StatusLevel::Running
        } else if state.last_error.is_some() {
            StatusLevel::Error
        } else if state.is_running() && state.last_run_at.is_none() {
            StatusLevel::Running
        } else {
            StatusLevel::Normal
        };
        Self {
            level,
            text: status_text(&state),
            state,
        }
    }
}
