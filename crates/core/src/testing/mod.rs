//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every capability the pipeline
//! and scheduler depend on, so both can be exercised without Firebird, 7z or npm.
//!
//! # Example
//!
//! ```rust,ignore
//! use restorekeeper_core::testing::{fixtures, MemoryTracker, MockArtifactSource, MockRestorer};
//!
//! let source = MockArtifactSource::with_artifacts(fixtures::artifacts(&[
//!     "bck-2024-01-01.ext",
//!     "bck-2024-01-02.ext",
//! ]));
//! let restorer = MockRestorer::new();
//! restorer.set_busy_failures(2);
//! ```

mod memory_tracker;
mod mock_extractor;
mod mock_migration;
mod mock_pipeline;
mod mock_restorer;
mod mock_source;
mod recording_reporter;

pub use memory_tracker::MemoryTracker;
pub use mock_extractor::{MockExtractor, PrepareHook};
pub use mock_migration::MockMigrationRunner;
pub use mock_pipeline::MockPipeline;
pub use mock_restorer::MockRestorer;
pub use mock_source::MockArtifactSource;
pub use recording_reporter::RecordingReporter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};
    use std::path::PathBuf;

    use crate::artifact::{sort_newest_first, Artifact};
    use crate::pipeline::{FailureKind, RunOutcome};

    fn epoch_plus(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Create an artifact under `/backups` with the given modification time.
    pub fn artifact_at(name: &str, modified_secs: i64) -> Artifact {
        Artifact::new(PathBuf::from("/backups").join(name), epoch_plus(modified_secs))
    }

    /// Create an artifact under `/backups`.
    pub fn artifact(name: &str) -> Artifact {
        artifact_at(name, 1_700_000_000)
    }

    /// Create artifacts sorted newest first.
    pub fn artifacts(names: &[&str]) -> Vec<Artifact> {
        let mut list: Vec<Artifact> = names.iter().map(|n| artifact(n)).collect();
        sort_newest_first(&mut list);
        list
    }

    /// A failed outcome with the given kind.
    pub fn failed(kind: FailureKind, reason: &str) -> RunOutcome {
        RunOutcome::Failed {
            kind,
            reason: reason.to_string(),
        }
    }
}
