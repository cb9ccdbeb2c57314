//! Scheduler control API handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use restorekeeper_core::{
    format_interval, PipelineRun, SchedulerError, SchedulerState, StatusLevel, StatusUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// Default number of runs returned by the runs endpoint
const DEFAULT_RUNS_LIMIT: usize = 20;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Scheduler status response
#[derive(Debug, Serialize)]
pub struct SchedulerStatusResponse {
    #[serde(flatten)]
    pub state: SchedulerState,
    pub level: StatusLevel,
    /// Operator-facing summary
    pub text: String,
    /// Interval in words, e.g. "2 hours"
    pub interval_text: String,
}

impl From<SchedulerState> for SchedulerStatusResponse {
    fn from(state: SchedulerState) -> Self {
        let interval_text = format_interval(state.interval_minutes);
        let update = StatusUpdate::from_state(state);
        Self {
            state: update.state,
            level: update.level,
            text: update.text,
            interval_text,
        }
    }
}

/// Request body for changing the interval
#[derive(Debug, Deserialize)]
pub struct SetIntervalBody {
    pub minutes: i64,
}

/// Query parameters for listing runs
#[derive(Debug, Deserialize)]
pub struct ListRunsParams {
    pub limit: Option<usize>,
}

/// Response for listing runs
#[derive(Debug, Serialize)]
pub struct ListRunsResponse {
    pub runs: Vec<PipelineRun>,
    pub count: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct SchedulerErrorResponse {
    pub error: String,
}

/// Maps scheduler errors onto HTTP status codes.
#[derive(Debug)]
pub struct SchedulerApiError(pub SchedulerError);

impl From<SchedulerError> for SchedulerApiError {
    fn from(error: SchedulerError) -> Self {
        Self(error)
    }
}

impl IntoResponse for SchedulerApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SchedulerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SchedulerError::AlreadyRunning => StatusCode::CONFLICT,
            SchedulerError::Terminated => StatusCode::GONE,
        };
        (
            status,
            Json(SchedulerErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Get scheduler status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SchedulerStatusResponse> {
    Json(state.scheduler().status().await.into())
}

/// Start the scheduler
pub async fn start(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchedulerStatusResponse>, SchedulerApiError> {
    state.scheduler().start().await?;
    Ok(Json(state.scheduler().status().await.into()))
}

/// Stop the scheduler
pub async fn stop(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchedulerStatusResponse>, SchedulerApiError> {
    state.scheduler().stop().await?;
    Ok(Json(state.scheduler().status().await.into()))
}

/// Restart the scheduler
pub async fn restart(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchedulerStatusResponse>, SchedulerApiError> {
    state.scheduler().restart().await?;
    Ok(Json(state.scheduler().status().await.into()))
}

/// Change the interval between runs
pub async fn set_interval(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetIntervalBody>,
) -> Result<Json<SchedulerStatusResponse>, SchedulerApiError> {
    state.scheduler().set_interval(body.minutes).await?;
    Ok(Json(state.scheduler().status().await.into()))
}

/// List recent pipeline runs, newest first
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListRunsParams>,
) -> Json<ListRunsResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_RUNS_LIMIT);
    let runs: Vec<PipelineRun> = state
        .scheduler()
        .recent_runs()
        .await
        .into_iter()
        .take(limit)
        .collect();
    Json(ListRunsResponse {
        count: runs.len(),
        runs,
    })
}
