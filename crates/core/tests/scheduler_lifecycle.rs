//! Scheduler lifecycle integration tests.
//!
//! Timing-sensitive cases run on paused time; stop latency is checked on the
//! real clock.

use std::sync::Arc;
use std::time::Duration;

use tokio_test::{assert_err, assert_ok};

use restorekeeper_core::{
    testing::{fixtures, MockPipeline, RecordingReporter},
    FailureKind, RunOutcome, Scheduler, SchedulerConfig, SchedulerError, SchedulerStatus,
    StatusLevel, StatusReporter,
};

fn test_config() -> SchedulerConfig {
    SchedulerConfig {
        tick_ms: 50,
        stop_timeout_ms: 2000,
        exit_grace_ms: 2000,
        ..SchedulerConfig::default()
    }
}

fn create_scheduler(config: SchedulerConfig) -> (Scheduler, Arc<MockPipeline>) {
    let pipeline = Arc::new(MockPipeline::new());
    let scheduler = Scheduler::new(config, pipeline.clone());
    (scheduler, pipeline)
}

/// Polls until `pipeline` has completed `count` runs.
async fn wait_for_completed(pipeline: &MockPipeline, count: u32) {
    for _ in 0..500 {
        if pipeline.completed_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} completed runs, got {}",
        count,
        pipeline.completed_count()
    );
}

/// Polls until the scheduler has recorded `count` runs and scheduled the next one.
async fn wait_for_recorded(scheduler: &Scheduler, count: u64) {
    for _ in 0..500 {
        let state = scheduler.status().await;
        if state.runs_completed >= count && state.next_run_at.is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} recorded runs", count);
}

async fn wait_for_started(pipeline: &MockPipeline, count: usize) {
    for _ in 0..500 {
        if pipeline.started_count().await >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} started runs", count);
}

#[tokio::test]
async fn test_initial_state_is_idle() {
    let (scheduler, pipeline) = create_scheduler(test_config());

    let state = scheduler.status().await;
    assert_eq!(state.status, SchedulerStatus::Idle);
    assert_eq!(state.interval_minutes, 60);
    assert!(state.last_run_at.is_none());
    assert!(!state.run_in_progress);
    assert_eq!(pipeline.started_count().await, 0);
}

#[tokio::test]
async fn test_start_runs_immediately() {
    let (scheduler, pipeline) = create_scheduler(test_config());

    assert_ok!(scheduler.start().await);
    wait_for_recorded(&scheduler, 1).await;
    assert_eq!(pipeline.completed_count(), 1);

    let state = scheduler.status().await;
    assert_eq!(state.status, SchedulerStatus::Running);
    assert_eq!(state.runs_completed, 1);
    assert!(state.last_run_at.is_some());
    assert_eq!(state.last_outcome, Some(RunOutcome::NoNewArtifact));

    assert_ok!(scheduler.stop().await);
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let (scheduler, pipeline) = create_scheduler(test_config());

    assert_ok!(scheduler.start().await);
    assert_eq!(scheduler.start().await, Err(SchedulerError::AlreadyRunning));

    wait_for_completed(&pipeline, 1).await;
    assert_eq!(pipeline.max_concurrent_runs(), 1);
    assert_ok!(scheduler.stop().await);
}

#[tokio::test]
async fn test_stop_while_sleeping_is_prompt() {
    let (scheduler, pipeline) = create_scheduler(test_config());

    assert_ok!(scheduler.start().await);
    wait_for_completed(&pipeline, 1).await;

    let started = std::time::Instant::now();
    assert_ok!(scheduler.stop().await);
    assert!(started.elapsed() < Duration::from_secs(2));

    let state = scheduler.status().await;
    assert_eq!(state.status, SchedulerStatus::Idle);
    assert!(state.next_run_at.is_none());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(pipeline.started_count().await, 1);
}

#[tokio::test]
async fn test_stop_when_idle_is_noop() {
    let (scheduler, _pipeline) = create_scheduler(test_config());

    assert_ok!(scheduler.stop().await);
    assert_ok!(scheduler.stop().await);
    assert_eq!(scheduler.status().await.status, SchedulerStatus::Idle);
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_run() {
    let (scheduler, pipeline) = create_scheduler(test_config());
    pipeline.set_run_duration(Duration::from_millis(200)).await;

    assert_ok!(scheduler.start().await);
    wait_for_started(&pipeline, 1).await;
    assert_ok!(scheduler.stop().await);

    // The run was allowed to finish.
    assert_eq!(pipeline.completed_count(), 1);
    assert!(!scheduler.status().await.run_in_progress);
    assert_eq!(scheduler.recent_runs().await.len(), 1);
}

#[tokio::test]
async fn test_stop_timeout_abandons_long_run() {
    let config = SchedulerConfig {
        stop_timeout_ms: 100,
        ..test_config()
    };
    let (scheduler, pipeline) = create_scheduler(config);
    pipeline.set_run_duration(Duration::from_secs(30)).await;

    assert_ok!(scheduler.start().await);
    wait_for_started(&pipeline, 1).await;

    let started = std::time::Instant::now();
    assert_ok!(scheduler.stop().await);
    assert!(started.elapsed() < Duration::from_secs(2));

    let state = scheduler.status().await;
    assert_eq!(state.status, SchedulerStatus::Idle);
    assert!(!state.run_in_progress);
    assert_eq!(pipeline.completed_count(), 0);
}

#[tokio::test]
async fn test_restart_never_overlaps_runs() {
    let (scheduler, pipeline) = create_scheduler(test_config());
    pipeline.set_run_duration(Duration::from_millis(100)).await;

    assert_ok!(scheduler.start().await);
    wait_for_started(&pipeline, 1).await;

    scheduler.restart().await.unwrap();
    wait_for_completed(&pipeline, 2).await;

    assert_eq!(pipeline.max_concurrent_runs(), 1);
    assert_eq!(scheduler.status().await.status, SchedulerStatus::Running);
    assert_ok!(scheduler.stop().await);
}

#[tokio::test]
async fn test_restart_abandons_long_run_before_starting_again() {
    let config = SchedulerConfig {
        stop_timeout_ms: 100,
        ..test_config()
    };
    let (scheduler, pipeline) = create_scheduler(config);
    pipeline.set_run_duration(Duration::from_secs(30)).await;

    assert_ok!(scheduler.start().await);
    wait_for_started(&pipeline, 1).await;

    let started = std::time::Instant::now();
    assert_ok!(scheduler.restart().await);
    assert!(started.elapsed() < Duration::from_secs(2));
    wait_for_started(&pipeline, 2).await;

    assert_eq!(pipeline.max_concurrent_runs(), 1);
    assert_eq!(pipeline.completed_count(), 0);
    let state = scheduler.status().await;
    assert_eq!(state.status, SchedulerStatus::Running);
    assert!(state.run_in_progress);

    assert_ok!(scheduler.stop().await);
}

#[tokio::test]
async fn test_restart_from_idle_starts() {
    let (scheduler, pipeline) = create_scheduler(test_config());

    scheduler.restart().await.unwrap();
    wait_for_completed(&pipeline, 1).await;
    assert_eq!(scheduler.status().await.status, SchedulerStatus::Running);
    assert_ok!(scheduler.stop().await);
}

#[tokio::test]
async fn test_invalid_interval_is_rejected() {
    let (scheduler, _pipeline) = create_scheduler(test_config());

    for minutes in [0, -5, i64::from(u32::MAX) + 1] {
        let result = scheduler.set_interval(minutes).await;
        assert!(
            matches!(result, Err(SchedulerError::InvalidArgument(_))),
            "{} minutes: {:?}",
            minutes,
            result
        );
    }
    assert_eq!(scheduler.status().await.interval_minutes, 60);

    scheduler.set_interval(15).await.unwrap();
    assert_eq!(scheduler.status().await.interval_minutes, 15);
}

#[tokio::test(start_paused = true)]
async fn test_runs_repeat_on_interval() {
    let config = test_config().with_interval_minutes(5);
    let (scheduler, pipeline) = create_scheduler(config);

    assert_ok!(scheduler.start().await);
    wait_for_completed(&pipeline, 1).await;

    tokio::time::sleep(Duration::from_secs(4 * 60)).await;
    assert_eq!(pipeline.started_count().await, 1);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(pipeline.started_count().await, 2);

    let starts = pipeline.run_starts().await;
    let gap = starts[1] - starts[0];
    assert!(gap >= Duration::from_secs(5 * 60), "{:?}", gap);
    assert!(gap < Duration::from_secs(5 * 60 + 1), "{:?}", gap);

    assert_ok!(scheduler.stop().await);
}

#[tokio::test(start_paused = true)]
async fn test_failed_run_backs_off_then_resumes_interval() {
    let config = test_config()
        .with_interval_minutes(60)
        .with_error_backoff_secs(60);
    let (scheduler, pipeline) = create_scheduler(config);
    pipeline
        .push_outcomes([fixtures::failed(FailureKind::ResourceBusy, "database in use")])
        .await;

    assert_ok!(scheduler.start().await);
    wait_for_recorded(&scheduler, 1).await;

    let state = scheduler.status().await;
    assert_eq!(state.last_error.as_deref(), Some("database in use"));
    assert!(state.next_run_at.is_some());

    // Retried after the back-off, long before the interval.
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(pipeline.started_count().await, 2);
    let starts = pipeline.run_starts().await;
    assert!(starts[1] - starts[0] < Duration::from_secs(62));

    // The success clears the error and the interval applies again.
    let state = scheduler.status().await;
    assert!(state.last_error.is_none());
    assert_eq!(state.last_outcome, Some(RunOutcome::NoNewArtifact));

    tokio::time::sleep(Duration::from_secs(30 * 60)).await;
    assert_eq!(pipeline.started_count().await, 2);
    tokio::time::sleep(Duration::from_secs(31 * 60)).await;
    assert_eq!(pipeline.started_count().await, 3);

    assert_ok!(scheduler.stop().await);
}

#[tokio::test(start_paused = true)]
async fn test_interval_change_applies_to_current_sleep() {
    let config = test_config().with_interval_minutes(60);
    let (scheduler, pipeline) = create_scheduler(config);

    assert_ok!(scheduler.start().await);
    wait_for_recorded(&scheduler, 1).await;
    let before = scheduler.status().await.next_run_at;

    scheduler.set_interval(2).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let after = scheduler.status().await.next_run_at;
    assert_ne!(before, after);

    tokio::time::sleep(Duration::from_secs(2 * 60 + 1)).await;
    assert_eq!(pipeline.started_count().await, 2);
    assert_eq!(scheduler.status().await.interval_minutes, 2);

    assert_ok!(scheduler.stop().await);
}

#[tokio::test(start_paused = true)]
async fn test_history_is_capped_newest_first() {
    let config = SchedulerConfig {
        history_size: 3,
        ..test_config().with_interval_minutes(1)
    };
    let (scheduler, pipeline) = create_scheduler(config);

    assert_ok!(scheduler.start().await);
    tokio::time::sleep(Duration::from_secs(5 * 60 + 30)).await;
    assert!(pipeline.completed_count() >= 5);

    let runs = scheduler.recent_runs().await;
    assert_eq!(runs.len(), 3);
    assert!(runs[0].started_at >= runs[1].started_at);
    assert!(runs[1].started_at >= runs[2].started_at);

    assert_ok!(scheduler.stop().await);
}

#[tokio::test]
async fn test_exit_is_terminal() {
    let (scheduler, pipeline) = create_scheduler(test_config());

    assert_ok!(scheduler.start().await);
    wait_for_completed(&pipeline, 1).await;
    scheduler.exit().await.unwrap();

    assert!(scheduler.is_terminated());
    assert_eq!(scheduler.status().await.status, SchedulerStatus::Stopped);

    assert_eq!(assert_err!(scheduler.start().await), SchedulerError::Terminated);
    assert_eq!(scheduler.restart().await, Err(SchedulerError::Terminated));
    assert_eq!(
        scheduler.set_interval(10).await,
        Err(SchedulerError::Terminated)
    );
    assert_ok!(scheduler.stop().await);
    scheduler.exit().await.unwrap();
    assert_eq!(scheduler.status().await.status, SchedulerStatus::Stopped);
}

#[tokio::test]
async fn test_reporters_follow_state() {
    let pipeline = Arc::new(MockPipeline::new());
    pipeline
        .set_default_outcome(fixtures::failed(FailureKind::ExternalTool, "gbak exited"))
        .await;
    let reporter = Arc::new(RecordingReporter::new());
    let scheduler = Scheduler::with_reporters(
        test_config(),
        pipeline.clone(),
        vec![reporter.clone() as Arc<dyn StatusReporter>],
    );

    assert_ok!(scheduler.start().await);
    wait_for_recorded(&scheduler, 1).await;

    let levels = reporter.levels();
    assert!(levels.contains(&StatusLevel::Running));
    let last = reporter.last().unwrap();
    assert_eq!(last.level, StatusLevel::Error);
    assert!(last.text.contains("gbak exited"));

    scheduler.exit().await.unwrap();
    let last = reporter.last().unwrap();
    assert_eq!(last.state.status, SchedulerStatus::Stopped);
    assert_eq!(last.text, "Scheduler exited");
}
