//! In-memory artifact tracker for testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::RwLock;

use crate::tracker::{ArtifactTracker, ProcessedSet, TrackerError};

/// Artifact tracker backed by memory.
///
/// Writes can be made to fail to exercise persistence errors.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    processed: RwLock<ProcessedSet>,
    fail_writes: AtomicBool,
    mark_calls: AtomicU32,
}

impl MemoryTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with `ids` already recorded.
    pub fn with_processed<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            processed: RwLock::new(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Make every following `mark_processed` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `mark_processed` calls, successful or not.
    pub fn mark_count(&self) -> u32 {
        self.mark_calls.load(Ordering::SeqCst)
    }

    /// Recorded identifiers in insertion order.
    pub fn processed_ids(&self) -> Vec<String> {
        let set = self.processed.read().unwrap_or_else(|e| e.into_inner());
        set.iter().map(str::to_string).collect()
    }
}

impl ArtifactTracker for MemoryTracker {
    fn list_processed(&self) -> Result<ProcessedSet, TrackerError> {
        Ok(self
            .processed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn mark_processed(&self, id: &str) -> Result<(), TrackerError> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TrackerError::persistence(
                "memory",
                std::io::Error::other("simulated write failure"),
            ));
        }
        self.processed
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id);
        Ok(())
    }
}
