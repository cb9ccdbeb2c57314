//! Trait definitions for the reporter module.

use super::types::StatusUpdate;

/// Receives scheduler state changes as they happen.
pub trait StatusReporter: Send + Sync {
    /// Called after every state change. Must not block.
    fn report(&self, update: &StatusUpdate);
}
