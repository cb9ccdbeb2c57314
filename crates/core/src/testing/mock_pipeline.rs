//! Mock pipeline for scheduler tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::pipeline::{Pipeline, PipelineRun, RunOutcome};

/// Mock implementation of the Pipeline trait.
///
/// Returns scripted outcomes in order, then a default outcome. Records when
/// each run started and how many runs overlapped.
#[derive(Debug)]
pub struct MockPipeline {
    script: Arc<RwLock<VecDeque<RunOutcome>>>,
    default_outcome: Arc<RwLock<RunOutcome>>,
    run_duration: Arc<RwLock<Duration>>,
    started: Arc<RwLock<Vec<Instant>>>,
    active: AtomicU32,
    max_active: AtomicU32,
    completed: AtomicU32,
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPipeline {
    /// Create a mock pipeline that always reports `NoNewArtifact`.
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_outcome: Arc::new(RwLock::new(RunOutcome::NoNewArtifact)),
            run_duration: Arc::new(RwLock::new(Duration::ZERO)),
            started: Arc::new(RwLock::new(Vec::new())),
            active: AtomicU32::new(0),
            max_active: AtomicU32::new(0),
            completed: AtomicU32::new(0),
        }
    }

    /// Queue outcomes for the next runs.
    pub async fn push_outcomes(&self, outcomes: impl IntoIterator<Item = RunOutcome>) {
        self.script.write().await.extend(outcomes);
    }

    /// Outcome used once the script is exhausted.
    pub async fn set_default_outcome(&self, outcome: RunOutcome) {
        *self.default_outcome.write().await = outcome;
    }

    /// Simulated run time.
    pub async fn set_run_duration(&self, duration: Duration) {
        *self.run_duration.write().await = duration;
    }

    /// Start instants of every run so far.
    pub async fn run_starts(&self) -> Vec<Instant> {
        self.started.read().await.clone()
    }

    pub async fn started_count(&self) -> usize {
        self.started.read().await.len()
    }

    pub fn completed_count(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Highest number of runs that were in progress at once.
    pub fn max_concurrent_runs(&self) -> u32 {
        self.max_active.load(Ordering::SeqCst)
    }
}

/// Decrements the active-run count on drop.
struct ActiveRun<'a>(&'a AtomicU32);

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Pipeline for MockPipeline {
    async fn run_once(&self) -> PipelineRun {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        // Released even when the scheduler aborts the run.
        let _active = ActiveRun(&self.active);
        self.started.write().await.push(Instant::now());

        let mut run = PipelineRun::begin();
        let duration = *self.run_duration.read().await;
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        let outcome = match self.script.write().await.pop_front() {
            Some(outcome) => outcome,
            None => self.default_outcome.read().await.clone(),
        };
        run.finish(outcome);

        self.completed.fetch_add(1, Ordering::SeqCst);
        run
    }
}
