//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline runs (outcomes, phase durations, busy retries)
//! - Scheduler (cycles, back-offs)
//! - External tools (invocations by exit result)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Pipeline runs total by outcome.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("restorekeeper_pipeline_runs_total", "Total pipeline runs"),
        &["outcome"], // "success", "no_new_artifact", "failed"
    )
    .unwrap()
});

/// Pipeline failures total by kind.
pub static PIPELINE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "restorekeeper_pipeline_failures_total",
            "Total failed pipeline runs by failure kind",
        ),
        &["kind"],
    )
    .unwrap()
});

/// Phase duration in seconds.
pub static PHASE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "restorekeeper_phase_duration_seconds",
            "Duration of pipeline phases",
        )
        .buckets(vec![
            0.1, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 7200.0,
        ]),
        &["phase"], // "detect", "prepare", "remove", "restore", "migrate", "record"
    )
    .unwrap()
});

/// Removal attempts that hit a busy target.
pub static BUSY_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restorekeeper_busy_retries_total",
        "Removal attempts that found the database in use",
    )
    .unwrap()
});

/// Artifacts recorded as processed.
pub static ARTIFACTS_PROCESSED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restorekeeper_artifacts_processed_total",
        "Artifacts fully restored, migrated and recorded",
    )
    .unwrap()
});

// =============================================================================
// Scheduler Metrics
// =============================================================================

/// Scheduler cycles total.
pub static SCHEDULER_CYCLES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restorekeeper_scheduler_cycles_total",
        "Pipeline runs started by the scheduler",
    )
    .unwrap()
});

/// Sleeps shortened to the error back-off.
pub static SCHEDULER_BACKOFFS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restorekeeper_scheduler_backoffs_total",
        "Cycles followed by the error back-off instead of the configured interval",
    )
    .unwrap()
});

// =============================================================================
// External Tool Metrics
// =============================================================================

/// External tool invocations by tool and result.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "restorekeeper_tool_invocations_total",
            "External tool invocations",
        ),
        &["tool", "result"], // result: "success", "failed", "timeout", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(PIPELINE_FAILURES.clone()),
        Box::new(PHASE_DURATION.clone()),
        Box::new(BUSY_RETRIES.clone()),
        Box::new(ARTIFACTS_PROCESSED.clone()),
        // Scheduler
        Box::new(SCHEDULER_CYCLES.clone()),
        Box::new(SCHEDULER_BACKOFFS.clone()),
        // External tools
        Box::new(TOOL_INVOCATIONS.clone()),
    ]
}
