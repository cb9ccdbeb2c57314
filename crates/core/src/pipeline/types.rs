//! Pipeline run records.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Detect,
    Prepare,
    Remove,
    Restore,
    Migrate,
    Record,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Prepare => "prepare",
            Self::Remove => "remove",
            Self::Restore => "restore",
            Self::Migrate => "migrate",
            Self::Record => "record",
        }
    }
}

/// How long a phase took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub duration_ms: u64,
}

/// Category of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The artifact source listed nothing.
    NoArtifactsAvailable,
    /// The artifact source could not be read.
    Source,
    /// The processed record could not be read.
    Tracker,
    /// The local copy could not be prepared.
    Extraction,
    /// The working database stayed in use.
    ResourceBusy,
    /// Restore produced a missing or empty database.
    RestoreVerification,
    /// An external tool failed.
    ExternalTool,
    /// The processed record could not be written.
    Persistence,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoArtifactsAvailable => "no_artifacts_available",
            Self::Source => "source",
            Self::Tracker => "tracker",
            Self::Extraction => "extraction",
            Self::ResourceBusy => "resource_busy",
            Self::RestoreVerification => "restore_verification",
            Self::ExternalTool => "external_tool",
            Self::Persistence => "persistence",
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// An artifact was restored, migrated and recorded.
    Success,
    /// Nothing new to process.
    NoNewArtifact,
    /// The run stopped early. The artifact was not recorded.
    Failed { kind: FailureKind, reason: String },
}

impl RunOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoNewArtifact => "no_new_artifact",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Record of one pipeline attempt. Kept in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Source artifact handled by this run, if one was selected.
    pub artifact_id: Option<String>,
    /// Prepared local copy, if preparation got that far.
    pub local_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub phases: Vec<PhaseTiming>,
    /// Removal attempts made on the working database.
    pub removal_attempts: u32,
}

impl PipelineRun {
    /// A run that has just started.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            artifact_id: None,
            local_id: None,
            started_at: now,
            finished_at: now,
            outcome: RunOutcome::NoNewArtifact,
            phases: Vec::new(),
            removal_attempts: 0,
        }
    }

    /// Records how long `phase` took.
    pub fn record_phase(&mut self, phase: Phase, elapsed: Duration) {
        self.phases.push(PhaseTiming {
            phase,
            duration_ms: elapsed.as_millis() as u64,
        });
    }

    /// Sets the outcome and finish time.
    pub fn finish(&mut self, outcome: RunOutcome) {
        self.outcome = outcome;
        self.finished_at = Utc::now();
    }

    /// Wall time of the whole run.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn phase_duration(&self, phase: Phase) -> Option<u64> {
        self.phases
            .iter()
            .find(|t| t.phase == phase)
            .map(|t| t.duration_ms)
    }
}
