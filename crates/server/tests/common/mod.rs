//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a mock pipeline behind a real scheduler, so the control surface can
//! be exercised without gbak, 7z or npm installed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use restorekeeper_core::{
    testing::MockPipeline, Config, Scheduler, SchedulerConfig, StatusReporter,
};
use restorekeeper_server::api::{create_router, WsBroadcaster};
use restorekeeper_server::state::AppState;

/// Re-export fixtures for test convenience
pub use restorekeeper_core::testing::fixtures;

/// Test fixture for API testing with a mock pipeline.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_start() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/scheduler/start").await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock pipeline - script run outcomes
    pub pipeline: Arc<MockPipeline>,
    /// The scheduler behind the API
    pub scheduler: Arc<Scheduler>,
    /// Broadcaster wired into the scheduler's reporters
    pub ws_broadcaster: WsBroadcaster,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(mut config: Config) -> Self {
        // Fast ticks so stop and restart return promptly
        config.scheduler = SchedulerConfig {
            tick_ms: 20,
            stop_timeout_ms: 1000,
            exit_grace_ms: 1000,
            ..config.scheduler
        };

        let pipeline = Arc::new(MockPipeline::new());
        let ws_broadcaster = WsBroadcaster::default();
        let scheduler = Arc::new(Scheduler::with_reporters(
            config.scheduler.clone(),
            pipeline.clone(),
            vec![Arc::new(ws_broadcaster.clone()) as Arc<dyn StatusReporter>],
        ));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&scheduler),
            ws_broadcaster.clone(),
        ));
        let router = create_router(state);

        Self {
            router,
            pipeline,
            scheduler,
            ws_broadcaster,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Fetch a non-JSON body, e.g. the metrics endpoint.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Wait until the scheduler has recorded `count` runs and scheduled the next one.
    pub async fn wait_for_runs(&self, count: u64) {
        for _ in 0..200 {
            let state = self.scheduler.status().await;
            if state.runs_completed >= count && state.next_run_at.is_some() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} runs, got {}",
            count,
            self.scheduler.status().await.runs_completed
        );
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
