//! Error types for the pipeline module.

use std::path::PathBuf;
use thiserror::Error;

use crate::artifact::SourceError;
use crate::extractor::ExtractorError;
use crate::migration::MigrationError;
use crate::restorer::RestorerError;
use crate::tracker::TrackerError;

use super::types::FailureKind;

/// Errors that abort a pipeline run.
///
/// Never escapes `run_once`; converted into `RunOutcome::Failed`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("artifact source error: {0}")]
    Source(#[from] SourceError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("preparation failed: {0}")]
    Extraction(#[from] ExtractorError),

    /// The working database stayed in use for every removal attempt.
    #[error("database {path} still in use after {attempts} removal attempts")]
    ResourceBusy {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: RestorerError,
    },

    #[error("restore failed: {0}")]
    Restorer(#[from] RestorerError),

    /// Restore finished but left no usable database.
    #[error("restored database {path} is {}", describe_size(.size))]
    RestoreVerification { path: PathBuf, size: Option<u64> },

    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),
}

fn describe_size(size: &Option<u64>) -> &'static str {
    match size {
        None => "missing",
        Some(_) => "empty",
    }
}

impl PipelineError {
    /// Category used in the run outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Source(_) => FailureKind::Source,
            Self::Tracker(TrackerError::NoArtifactsAvailable) => FailureKind::NoArtifactsAvailable,
            Self::Tracker(TrackerError::Persistence { .. }) => FailureKind::Persistence,
            Self::Tracker(TrackerError::Read { .. }) => FailureKind::Tracker,
            Self::Extraction(_) => FailureKind::Extraction,
            Self::ResourceBusy { .. } => FailureKind::ResourceBusy,
            Self::Restorer(e) if e.is_busy() => FailureKind::ResourceBusy,
            Self::Restorer(_) => FailureKind::ExternalTool,
            Self::RestoreVerification { .. } => FailureKind::RestoreVerification,
            Self::Migration(_) => FailureKind::ExternalTool,
        }
    }
}
