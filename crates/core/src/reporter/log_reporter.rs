//! Reporter that writes status changes to the log.

use tracing::{info, warn};

use super::traits::StatusReporter;
use super::types::{StatusLevel, StatusUpdate};

/// Logs every status update.
#[derive(Debug, Default)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl StatusReporter for LogReporter {
    fn report(&self, update: &StatusUpdate) {
        let text = update.text.replace('\n', ", ");
        match update.level {
            StatusLevel::Error => warn!(status = update.state.status.as_str(), "{}", text),
            _ => info!(status = update.state.status.as_str(), "{}", text),
        }
    }
}
