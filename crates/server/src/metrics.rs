//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the restorekeeper server:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Scheduler status (collected dynamically)
//!
//! Pipeline and tool metrics live in the core crate and are registered here.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::error;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "restorekeeper_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("restorekeeper_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restorekeeper_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restorekeeper_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restorekeeper_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "restorekeeper_ws_messages_sent_total",
            "WebSocket messages sent",
        ),
        &["type"],
    )
    .unwrap()
});

/// WebSocket lag events (when client falls behind).
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restorekeeper_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .unwrap()
});

// =============================================================================
// Scheduler Metrics (collected dynamically)
// =============================================================================

/// Scheduler loop state (1 = running, 0 = idle or exited).
pub static SCHEDULER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restorekeeper_scheduler_running",
        "Whether the scheduler loop is running (1) or not (0)",
    )
    .unwrap()
});

/// Configured interval between runs.
pub static SCHEDULER_INTERVAL_MINUTES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restorekeeper_scheduler_interval_minutes",
        "Minutes between the end of one run and the start of the next",
    )
    .unwrap()
});

/// Unix time the last run finished, 0 before the first run.
pub static SCHEDULER_LAST_RUN_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restorekeeper_scheduler_last_run_timestamp_seconds",
        "Unix time the last pipeline run finished",
    )
    .unwrap()
});

/// Whether the last run failed.
pub static SCHEDULER_LAST_RUN_FAILED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restorekeeper_scheduler_last_run_failed",
        "Whether the last pipeline run failed (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_SENT.clone()))
        .unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();

    // Scheduler
    registry
        .register(Box::new(SCHEDULER_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_INTERVAL_MINUTES.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_LAST_RUN_TIMESTAMP.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_LAST_RUN_FAILED.clone()))
        .unwrap();

    // Core metrics (pipeline, scheduler loop, external tools)
    for metric in restorekeeper_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from the scheduler state.
///
/// Called before encoding so the gauges reflect the current snapshot.
pub async fn collect_dynamic_metrics(state: &AppState) {
    let status = state.scheduler().status().await;

    SCHEDULER_RUNNING.set(i64::from(status.is_running()));
    SCHEDULER_INTERVAL_MINUTES.set(i64::from(status.interval_minutes));
    SCHEDULER_LAST_RUN_TIMESTAMP.set(status.last_run_at.map(|t| t.timestamp()).unwrap_or(0));
    SCHEDULER_LAST_RUN_FAILED.set(i64::from(status.last_error.is_some()));
}
