//! Background scheduler and its control surface.
//!
//! One spawned task runs the pipeline, sleeps for the interval (or the error
//! back-off after a failure) and repeats. Control operations are serialized
//! through a single mutex; the state snapshot sits behind its own lock so
//! `status()` never waits on a stop in progress.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::metrics;
use crate::pipeline::{Pipeline, PipelineRun, RunOutcome};
use crate::reporter::{format_interval, StatusReporter, StatusUpdate};

use super::config::SchedulerConfig;
use super::persist::write_interval_file;
use super::types::{SchedulerError, SchedulerState, SchedulerStatus};

/// State shared between the control surface and the loop task.
struct Shared {
    state: RwLock<SchedulerState>,
    history: RwLock<VecDeque<PipelineRun>>,
    history_size: usize,
    reporters: Vec<Arc<dyn StatusReporter>>,
    terminated: AtomicBool,
}

impl Shared {
    /// Applies `change` under the state lock, then pushes the new state.
    async fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut SchedulerState),
    {
        let snapshot = {
            let mut state = self.state.write().await;
            change(&mut state);
            state.clone()
        };
        self.publish(snapshot);
    }

    fn publish(&self, snapshot: SchedulerState) {
        let update = StatusUpdate::from_state(snapshot);
        for reporter in &self.reporters {
            reporter.report(&update);
        }
    }

    async fn record(&self, run: PipelineRun) {
        if self.history_size == 0 {
            return;
        }
        let mut history = self.history.write().await;
        if history.len() == self.history_size {
            history.pop_back();
        }
        history.push_front(run);
    }
}

/// A running loop task.
struct LoopTask {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

/// Control-side bookkeeping. Only touched under `Scheduler::control`.
#[derive(Default)]
struct Control {
    task: Option<LoopTask>,
}

/// Runs a pipeline on an interval, with start/stop/restart/exit control.
pub struct Scheduler {
    config: SchedulerConfig,
    pipeline: Arc<dyn Pipeline>,
    shared: Arc<Shared>,
    control: Mutex<Control>,
}

impl Scheduler {
    /// Create a new scheduler in the `Idle` state.
    pub fn new(config: SchedulerConfig, pipeline: Arc<dyn Pipeline>) -> Self {
        Self::with_reporters(config, pipeline, Vec::new())
    }

    /// Create a scheduler that pushes status changes to `reporters`.
    pub fn with_reporters(
        config: SchedulerConfig,
        pipeline: Arc<dyn Pipeline>,
        reporters: Vec<Arc<dyn StatusReporter>>,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: RwLock::new(SchedulerState::new(config.interval_minutes.max(1))),
            history: RwLock::new(VecDeque::new()),
            history_size: config.history_size,
            reporters,
            terminated: AtomicBool::new(false),
        });
        Self {
            config,
            pipeline,
            shared,
            control: Mutex::new(Control::default()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current state snapshot.
    pub async fn status(&self) -> SchedulerState {
        self.shared.state.read().await.clone()
    }

    /// Recent pipeline runs, newest first.
    pub async fn recent_runs(&self) -> Vec<PipelineRun> {
        self.shared.history.read().await.iter().cloned().collect()
    }

    /// Whether `exit` has been called.
    pub fn is_terminated(&self) -> bool {
        self.shared.terminated.load(Ordering::SeqCst)
    }

    /// Start the background loop. The first run happens immediately.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut control = self.control.lock().await;
        self.start_locked(&mut control).await
    }

    /// Stop the background loop. Does nothing when already idle.
    ///
    /// Waits for an in-flight run to finish, up to `stop_timeout_ms`, then
    /// aborts the task, which kills the process trees of any tool it was running.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut control = self.control.lock().await;
        if self.is_terminated() {
            return Ok(());
        }
        self.stop_locked(&mut control, self.config.stop_timeout())
            .await;
        Ok(())
    }

    /// Stop, then start. The old loop is gone before the new one spawns.
    pub async fn restart(&self) -> Result<(), SchedulerError> {
        let mut control = self.control.lock().await;
        if self.is_terminated() {
            return Err(SchedulerError::Terminated);
        }
        info!("Restarting scheduler");
        self.stop_locked(&mut control, self.config.stop_timeout())
            .await;
        self.start_locked(&mut control).await
    }

    /// Change the interval. Applies to the current sleep, not to a run in progress.
    ///
    /// With `interval_file` configured the new value is also written there so it
    /// outlives the process. A failed write is logged; the change still applies.
    pub async fn set_interval(&self, minutes: i64) -> Result<(), SchedulerError> {
        if minutes <= 0 {
            return Err(SchedulerError::InvalidArgument(format!(
                "interval must be a positive number of minutes, got {}",
                minutes
            )));
        }
        let minutes = u32::try_from(minutes).map_err(|_| {
            SchedulerError::InvalidArgument(format!("interval of {} minutes is too large", minutes))
        })?;

        let _control = self.control.lock().await;
        if self.is_terminated() {
            return Err(SchedulerError::Terminated);
        }

        self.shared
            .update(|state| state.interval_minutes = minutes)
            .await;
        info!("Interval changed to {}", format_interval(minutes));

        if let Some(path) = &self.config.interval_file {
            match write_interval_file(path, minutes).await {
                Ok(()) => debug!("Saved interval to {}", path.display()),
                Err(e) => warn!("Failed to save interval to {}: {}", path.display(), e),
            }
        }
        Ok(())
    }

    /// Stop for good. Later control calls return `Terminated`.
    ///
    /// An in-flight run gets `exit_grace_ms` to finish before it is abandoned.
    pub async fn exit(&self) -> Result<(), SchedulerError> {
        let mut control = self.control.lock().await;
        if self.is_terminated() {
            return Ok(());
        }
        info!("Scheduler exiting");
        self.stop_locked(&mut control, self.config.exit_grace())
            .await;
        self.shared.terminated.store(true, Ordering::SeqCst);
        self.shared
            .update(|state| state.status = SchedulerStatus::Stopped)
            .await;
        Ok(())
    }

    async fn start_locked(&self, control: &mut Control) -> Result<(), SchedulerError> {
        if self.is_terminated() {
            return Err(SchedulerError::Terminated);
        }
        if let Some(task) = &control.task {
            if !task.handle.is_finished() {
                return Err(SchedulerError::AlreadyRunning);
            }
            warn!("Scheduler loop ended unexpectedly, starting a new one");
            control.task = None;
        }

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        self.shared
            .update(|state| {
                state.status = SchedulerStatus::Running;
                state.next_run_at = None;
            })
            .await;

        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.shared),
            Arc::clone(&self.pipeline),
            self.config.clone(),
            shutdown_rx,
        ));
        control.task = Some(LoopTask {
            shutdown_tx,
            handle,
        });

        let interval = self.shared.state.read().await.interval_minutes;
        info!("Scheduler started, interval {}", format_interval(interval));
        Ok(())
    }

    /// Stops the loop, waiting at most `limit` before aborting it.
    async fn stop_locked(&self, control: &mut Control, limit: Duration) {
        let Some(task) = control.task.take() else {
            debug!("Scheduler already idle");
            return;
        };

        info!("Stopping scheduler");
        self.shared
            .update(|state| state.status = SchedulerStatus::Stopping)
            .await;

        let _ = task.shutdown_tx.send(());
        let mut handle = task.handle;
        match tokio::time::timeout(limit, &mut handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Scheduler loop ended abnormally: {}", e),
            Err(_) => {
                warn!(
                    "Scheduler loop did not stop within {}ms, aborting the in-flight run",
                    limit.as_millis()
                );
                handle.abort();
                let _ = handle.await;
            }
        }

        self.shared
            .update(|state| {
                state.status = SchedulerStatus::Idle;
                state.run_in_progress = false;
                state.next_run_at = None;
            })
            .await;
        info!("Scheduler stopped");
    }
}

/// Whether a shutdown was signalled without waiting for one.
fn shutdown_requested(rx: &mut broadcast::Receiver<()>) -> bool {
    !matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty))
}

async fn run_loop(
    shared: Arc<Shared>,
    pipeline: Arc<dyn Pipeline>,
    config: SchedulerConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let tick = config.tick();

    loop {
        if shutdown_requested(&mut shutdown_rx) {
            return;
        }

        shared
            .update(|state| {
                state.run_in_progress = true;
                state.next_run_at = None;
            })
            .await;
        metrics::SCHEDULER_CYCLES.inc();

        let run = pipeline.run_once().await;
        let failed = run.outcome.is_failed();
        let outcome = run.outcome.clone();
        shared.record(run).await;

        let finished = Instant::now();
        let finished_at = Utc::now();
        shared
            .update(|state| {
                state.run_in_progress = false;
                state.last_run_at = Some(finished_at);
                state.runs_completed += 1;
                state.last_error = match &outcome {
                    RunOutcome::Failed { reason, .. } => Some(reason.clone()),
                    _ => None,
                };
                state.last_outcome = Some(outcome);
            })
            .await;

        if failed {
            metrics::SCHEDULER_BACKOFFS.inc();
            info!(
                "Run failed, retrying in {}s",
                config.error_backoff().as_secs()
            );
        }

        // Sleep in slices so interval changes are picked up while waiting.
        let mut announced: Option<Duration> = None;
        loop {
            let wait = if failed {
                config.error_backoff()
            } else {
                let minutes = shared.state.read().await.interval_minutes;
                Duration::from_secs(u64::from(minutes) * 60)
            };
            let deadline = finished + wait;
            let now = Instant::now();

            if announced != Some(wait) {
                let remaining = deadline.saturating_duration_since(now);
                let next_run_at = chrono::Duration::from_std(remaining)
                    .ok()
                    .and_then(|d| Utc::now().checked_add_signed(d));
                shared.update(|state| state.next_run_at = next_run_at).await;
                if announced.is_some() {
                    debug!("Next run rescheduled after interval change");
                }
                announced = Some(wait);
            }

            if now >= deadline {
                break;
            }

            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = tokio::time::sleep(tick.min(deadline - now)) => {}
            }
        }
    }
}
