//! Scheduler control API tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use restorekeeper_core::{FailureKind, RunOutcome};
use restorekeeper_server::api::WsMessage;

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_password() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["restorer"]["password_configured"], true);
    assert!(response.body["restorer"].get("password").is_none());
    assert_eq!(response.body["source"]["prefix"], "bckfdb-");
}

#[tokio::test]
async fn test_status_before_start() {
    let fixture = TestFixture::new();

    let response = fixture.get("/api/v1/scheduler/status").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "idle");
    assert_eq!(response.body["interval_minutes"], 60);
    assert_eq!(response.body["interval_text"], "1 hour");
    assert_eq!(response.body["text"], "Scheduler stopped");
    assert_eq!(response.body["level"], "normal");
}

#[tokio::test]
async fn test_start_then_start_again_conflicts() {
    let fixture = TestFixture::new();

    let response = fixture.post("/api/v1/scheduler/start").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "running");

    let response = fixture.post("/api/v1/scheduler/start").await;
    assert_status!(response, StatusCode::CONFLICT);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("already running"));

    fixture.scheduler.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_runs_pipeline_and_stop_returns_idle() {
    let fixture = TestFixture::new();

    fixture.post("/api/v1/scheduler/start").await;
    fixture.wait_for_runs(1).await;

    let response = fixture.get("/api/v1/scheduler/status").await;
    assert_eq!(response.body["runs_completed"], 1);
    assert_eq!(response.body["last_outcome"]["status"], "no_new_artifact");
    assert!(response.body["next_run_at"].is_string());

    let response = fixture.post("/api/v1/scheduler/stop").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "idle");
    assert!(response.body["next_run_at"].is_null());

    // Stopping again is fine
    let response = fixture.post("/api/v1/scheduler/stop").await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_restart() {
    let fixture = TestFixture::new();

    fixture.post("/api/v1/scheduler/start").await;
    fixture.wait_for_runs(1).await;

    let response = fixture.post("/api/v1/scheduler/restart").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "running");

    fixture.wait_for_runs(2).await;
    assert_eq!(fixture.pipeline.max_concurrent_runs(), 1);

    fixture.scheduler.stop().await.unwrap();
}

#[tokio::test]
async fn test_set_interval() {
    let fixture = TestFixture::new();

    let response = fixture
        .put("/api/v1/scheduler/interval", json!({ "minutes": 120 }))
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["interval_minutes"], 120);
    assert_eq!(response.body["interval_text"], "2 hours");
}

#[tokio::test]
async fn test_set_interval_rejects_non_positive() {
    let fixture = TestFixture::new();

    for minutes in [0, -5] {
        let response = fixture
            .put("/api/v1/scheduler/interval", json!({ "minutes": minutes }))
            .await;
        assert_status!(response, StatusCode::BAD_REQUEST);
        assert!(response.body["error"].is_string());
    }

    let response = fixture.get("/api/v1/scheduler/status").await;
    assert_eq!(response.body["interval_minutes"], 60);
}

#[tokio::test]
async fn test_set_interval_rejects_malformed_body() {
    let fixture = TestFixture::new();

    let response = fixture
        .put("/api/v1/scheduler/interval", json!({ "minutes": "soon" }))
        .await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_runs_lists_history_newest_first() {
    let fixture = TestFixture::new();
    fixture
        .pipeline
        .push_outcomes([fixtures::failed(FailureKind::ResourceBusy, "database in use")])
        .await;

    fixture.post("/api/v1/scheduler/start").await;
    fixture.wait_for_runs(1).await;
    fixture.scheduler.stop().await.unwrap();

    let response = fixture.get("/api/v1/scheduler/runs").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["count"], 1);
    let run = &response.body["runs"][0];
    assert_eq!(run["outcome"]["status"], "failed");
    assert_eq!(run["outcome"]["kind"], "resource_busy");

    let response = fixture.get("/api/v1/scheduler/status").await;
    assert_eq!(response.body["level"], "error");
    assert_eq!(response.body["last_error"], "database in use");
}

#[tokio::test]
async fn test_runs_limit() {
    let fixture = TestFixture::new();
    fixture.pipeline.push_outcomes([RunOutcome::Success]).await;

    fixture.post("/api/v1/scheduler/start").await;
    fixture.wait_for_runs(1).await;
    fixture.post("/api/v1/scheduler/restart").await;
    fixture.wait_for_runs(2).await;
    fixture.scheduler.stop().await.unwrap();

    let response = fixture.get("/api/v1/scheduler/runs?limit=1").await;
    assert_eq!(response.body["count"], 1);
    assert_eq!(response.body["runs"][0]["outcome"]["status"], "no_new_artifact");
}

#[tokio::test]
async fn test_commands_after_exit_are_gone() {
    let fixture = TestFixture::new();
    fixture.scheduler.exit().await.unwrap();

    let response = fixture.post("/api/v1/scheduler/start").await;
    assert_status!(response, StatusCode::GONE);

    let response = fixture.post("/api/v1/scheduler/restart").await;
    assert_status!(response, StatusCode::GONE);

    let response = fixture
        .put("/api/v1/scheduler/interval", json!({ "minutes": 5 }))
        .await;
    assert_status!(response, StatusCode::GONE);

    let response = fixture.get("/api/v1/scheduler/status").await;
    assert_eq!(response.body["status"], "stopped");
    assert_eq!(response.body["text"], "Scheduler exited");
}

#[tokio::test]
async fn test_status_changes_are_broadcast() {
    let fixture = TestFixture::new();
    let mut rx = fixture.ws_broadcaster.subscribe();

    fixture.post("/api/v1/scheduler/start").await;

    match rx.recv().await.unwrap() {
        WsMessage::Status(update) => assert!(update.state.is_running()),
        other => panic!("unexpected message: {:?}", other),
    }

    fixture.scheduler.stop().await.unwrap();
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let (status, body) = fixture.get_text("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("restorekeeper_http_requests_total"));
    assert!(body.contains("restorekeeper_scheduler_running"));
    assert!(body.contains("restorekeeper_scheduler_interval_minutes"));
}
