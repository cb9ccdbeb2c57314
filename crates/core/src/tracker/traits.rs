//! Trait definitions for the tracker module.

use crate::artifact::Artifact;

use super::error::TrackerError;
use super::types::ProcessedSet;

/// Durable record of which artifacts have been fully processed.
///
/// Implementations are synchronous; the record is small and written once per
/// successful run.
pub trait ArtifactTracker: Send + Sync {
    /// All recorded identifiers. A missing record is an empty set.
    fn list_processed(&self) -> Result<ProcessedSet, TrackerError>;

    /// Whether `id` has been recorded.
    fn is_processed(&self, id: &str) -> Result<bool, TrackerError> {
        Ok(self.list_processed()?.contains(id))
    }

    /// Durably records `id` as processed.
    fn mark_processed(&self, id: &str) -> Result<(), TrackerError>;

    /// Returns the newest candidate if it has not been processed.
    ///
    /// `candidates` must be ordered newest first. Artifacts older than the
    /// newest one are stale once it exists and are never selected, so an
    /// already processed newest candidate means there is nothing to do.
    ///
    /// Returns `TrackerError::NoArtifactsAvailable` when `candidates` is empty.
    fn find_next_unprocessed(
        &self,
        candidates: &[Artifact],
    ) -> Result<Option<Artifact>, TrackerError> {
        let Some(newest) = candidates.first() else {
            return Err(TrackerError::NoArtifactsAvailable);
        };
        if self.is_processed(&newest.id)? {
            return Ok(None);
        }
        Ok(Some(newest.clone()))
    }
}
