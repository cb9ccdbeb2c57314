//! Pipeline runner implementation.
//!
//! One run walks the next unprocessed artifact through:
//! detect, prepare, remove (with busy retry), restore, migrate, record.
//! The artifact is recorded only after every other step succeeded, so any
//! failure leaves it eligible for the next run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::artifact::{Artifact, ArtifactSource};
use crate::extractor::{ArchiveExtractor, LocalArtifact};
use crate::metrics;
use crate::migration::MigrationRunner;
use crate::restorer::DatabaseRestorer;
use crate::tracker::ArtifactTracker;

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::traits::Pipeline;
use super::types::{Phase, PipelineRun, RunOutcome};

/// Runs the restore and migrate sequence against the configured capabilities.
pub struct PipelineRunner {
    config: PipelineConfig,
    source: Arc<dyn ArtifactSource>,
    tracker: Arc<dyn ArtifactTracker>,
    extractor: Arc<dyn ArchiveExtractor>,
    restorer: Arc<dyn DatabaseRestorer>,
    migration: Arc<dyn MigrationRunner>,
    /// Held for the whole of a run; the working database is not shared.
    run_lock: Mutex<()>,
}

impl PipelineRunner {
    /// Create a new pipeline runner.
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn ArtifactSource>,
        tracker: Arc<dyn ArtifactTracker>,
        extractor: Arc<dyn ArchiveExtractor>,
        restorer: Arc<dyn DatabaseRestorer>,
        migration: Arc<dyn MigrationRunner>,
    ) -> Self {
        Self {
            config,
            source,
            tracker,
            extractor,
            restorer,
            migration,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    async fn execute(&self, run: &mut PipelineRun) -> Result<RunOutcome, PipelineError> {
        // Detect
        let started = Instant::now();
        let candidates = self.source.list().await?;
        let next = self.tracker.find_next_unprocessed(&candidates)?;
        observe(run, Phase::Detect, started.elapsed());

        let Some(artifact) = next else {
            info!("No new artifact to process");
            return Ok(RunOutcome::NoNewArtifact);
        };
        info!(artifact = %artifact.id, "Processing artifact");
        run.artifact_id = Some(artifact.id.clone());

        // Prepare
        let started = Instant::now();
        let local = self.extractor.prepare_local_copy(&artifact).await?;
        observe(run, Phase::Prepare, started.elapsed());
        run.local_id = Some(local.id.clone());

        if self.already_processed(&artifact, &local)? {
            info!(
                artifact = %artifact.id,
                "Artifact was processed while it was being prepared, skipping restore"
            );
            return Ok(RunOutcome::Success);
        }

        // Remove
        let started = Instant::now();
        let removal = self.remove_with_retry(run).await;
        observe(run, Phase::Remove, started.elapsed());
        removal?;

        // Restore
        let started = Instant::now();
        let restored = self.restore_and_verify(&local).await;
        observe(run, Phase::Restore, started.elapsed());
        restored?;

        // Migrate
        let started = Instant::now();
        let migrated = self.migrate().await;
        observe(run, Phase::Migrate, started.elapsed());
        migrated?;

        // Record
        let started = Instant::now();
        self.tracker.mark_processed(&artifact.id)?;
        observe(run, Phase::Record, started.elapsed());
        metrics::ARTIFACTS_PROCESSED.inc();

        Ok(RunOutcome::Success)
    }

    fn already_processed(
        &self,
        artifact: &Artifact,
        local: &LocalArtifact,
    ) -> Result<bool, PipelineError> {
        if self.tracker.is_processed(&artifact.id)? {
            return Ok(true);
        }
        Ok(local.id != artifact.id && self.tracker.is_processed(&local.id)?)
    }

    /// Removes the working database, forcing clients off between busy attempts.
    async fn remove_with_retry(&self, run: &mut PipelineRun) -> Result<(), PipelineError> {
        let max_attempts = self.config.busy_retry_attempts.max(1);
        let grace = Duration::from_millis(self.config.busy_retry_grace_ms);

        loop {
            run.removal_attempts += 1;
            let attempt = run.removal_attempts;

            let err = match self.restorer.remove_target().await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_busy() => e,
                Err(e) => return Err(e.into()),
            };
            metrics::BUSY_RETRIES.inc();

            if attempt >= max_attempts {
                error!(
                    attempt,
                    "Database still in use after {} attempts: {}", max_attempts, err
                );
                return Err(PipelineError::ResourceBusy {
                    path: self.restorer.target_path().to_path_buf(),
                    attempts: attempt,
                    source: err,
                });
            }

            warn!(
                attempt,
                "Database in use, disconnecting users and retrying in {}ms", grace.as_millis()
            );
            if let Err(e) = self.restorer.force_disconnect_all().await {
                warn!("Failed to disconnect users: {}", e);
            }
            tokio::time::sleep(grace).await;
        }
    }

    async fn restore_and_verify(&self, local: &LocalArtifact) -> Result<(), PipelineError> {
        self.restorer.restore(&local.path).await?;

        let size = self.restorer.target_size().await?;
        match size {
            Some(bytes) if bytes > 0 => {
                info!(
                    "Restored database size: {:.2} MB",
                    bytes as f64 / 1024.0 / 1024.0
                );
                Ok(())
            }
            _ => Err(PipelineError::RestoreVerification {
                path: self.restorer.target_path().to_path_buf(),
                size,
            }),
        }
    }

    async fn migrate(&self) -> Result<(), PipelineError> {
        self.migration.ensure_dependencies().await?;
        self.migration.run().await?;
        Ok(())
    }
}

fn observe(run: &mut PipelineRun, phase: Phase, elapsed: Duration) {
    metrics::PHASE_DURATION
        .with_label_values(&[phase.as_str()])
        .observe(elapsed.as_secs_f64());
    run.record_phase(phase, elapsed);
}

#[async_trait]
impl Pipeline for PipelineRunner {
    async fn run_once(&self) -> PipelineRun {
        let _guard = self.run_lock.lock().await;
        let mut run = PipelineRun::begin();

        let outcome = match self.execute(&mut run).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let kind = e.kind();
                error!(
                    artifact = run.artifact_id.as_deref().unwrap_or("-"),
                    kind = kind.as_str(),
                    "Pipeline run failed: {}",
                    e
                );
                metrics::PIPELINE_FAILURES
                    .with_label_values(&[kind.as_str()])
                    .inc();
                RunOutcome::Failed {
                    kind,
                    reason: e.to_string(),
                }
            }
        };

        run.finish(outcome);
        metrics::PIPELINE_RUNS
            .with_label_values(&[run.outcome.label()])
            .inc();

        if run.outcome == RunOutcome::Success {
            info!(
                artifact = run.artifact_id.as_deref().unwrap_or("-"),
                "Pipeline run completed in {}ms",
                run.duration_ms()
            );
        }
        run
    }
}
