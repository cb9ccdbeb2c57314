//! Status reporter that records every update.

use std::sync::Mutex;

use crate::reporter::{StatusLevel, StatusReporter, StatusUpdate};

/// Collects status updates for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    updates: Mutex<Vec<StatusUpdate>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates received so far.
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<StatusUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Levels of all updates in order.
    pub fn levels(&self) -> Vec<StatusLevel> {
        self.updates().into_iter().map(|u| u.level).collect()
    }

    pub fn clear(&self) {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, update: &StatusUpdate) {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(update.clone());
    }
}
