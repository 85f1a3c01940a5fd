//! Fallback Integration Tests
//!
//! Runs the orchestrator against real HTTP upstreams bound to 127.0.0.1:0:
//! a second engine instance, fixed-response stubs, failing stubs and a
//! stub that never answers in time.

use pdm_engine::api::{create_app, DashboardState};
use pdm_engine::config::UpstreamConfig;
use pdm_engine::orchestrator::{LocalScoring, LocalSynthesis, RemoteScorer, RemoteTelemetry};
use pdm_engine::types::FailureMode;
use pdm_engine::{scoring, FallbackOrchestrator, PredictionRequest, RiskLevel, Store, TelemetryWindow};

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn serve_engine() -> SocketAddr {
    let state = DashboardState::new(
        Arc::new(Store::new()),
        Arc::new(FallbackOrchestrator::local_only(Duration::from_secs(1))),
        "2.1.0",
    );
    serve(create_app(state)).await
}

fn week_request(machine_id: &str) -> PredictionRequest {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    PredictionRequest::new(machine_id, TelemetryWindow::new(start, end).unwrap())
}

fn upstream(telemetry_url: Option<String>, scorer_url: Option<String>, timeout_ms: u64) -> UpstreamConfig {
    UpstreamConfig { telemetry_url, scorer_url, timeout_ms }
}

#[tokio::test]
async fn test_unreachable_remotes_fall_back_to_local() {
    // Nothing listens on port 1; both remotes fail at connect.
    let config = upstream(
        Some("http://127.0.0.1:1".into()),
        Some("http://127.0.0.1:1/ml".into()),
        500,
    );
    let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();

    let outcome = orchestrator.predict_traced(&week_request("2")).await;
    assert_eq!(outcome.telemetry_source, LocalSynthesis::NAME);
    assert_eq!(outcome.scored_by, LocalScoring::NAME);

    let result = &outcome.result;
    let local = scoring::score("2", &outcome.telemetry);
    assert_eq!(result.score, local.score);
    assert_eq!(result.risk, RiskLevel::from_score(result.score));
    assert_eq!(result.top_features.len(), 3);

    let types = result.failure_types.clone().unwrap();
    assert_eq!(types.len(), 5);
    let again = orchestrator.predict(&week_request("2")).await;
    assert_eq!(again.failure_types.unwrap(), types);
    assert_eq!(types[&FailureMode::HeatDissipation], 0.0);
}

#[tokio::test]
async fn test_remote_engine_serves_both_stages() {
    let addr = serve_engine().await;
    let config = upstream(
        Some(format!("http://{addr}")),
        Some(format!("http://{addr}/api/v2/ml")),
        2_000,
    );
    let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();

    let outcome = orchestrator.predict_traced(&week_request("6")).await;
    assert_eq!(outcome.telemetry_source, RemoteTelemetry::NAME);
    assert_eq!(outcome.scored_by, RemoteScorer::NAME);

    let speed = outcome.telemetry.rotational_speed.unwrap();
    assert!((1200.0..=2200.0).contains(&speed));
    assert_eq!(outcome.telemetry.machine_type, Some(2.0));

    let expected = scoring::score("6", &outcome.telemetry);
    assert_eq!(outcome.result.score, expected.score);
    assert_eq!(outcome.result.risk, expected.risk);
    assert_eq!(outcome.result.top_features.len(), 3);
    // Physics-based estimate from the remote carries every failure mode.
    assert_eq!(outcome.result.failure_types.as_ref().map(|t| t.len()), Some(5));
}

#[tokio::test]
async fn test_remote_tier_is_rederived_from_score() {
    let scorer = Router::new().route(
        "/predict",
        post(|| async {
            Json(json!({
                "score": 20.0,
                "risk": "low",
                "explanation": "Everything nominal.",
                "shapFeatures": [
                    {"feature": "Torque", "value": 41.0, "impact": 8.0},
                    {"feature": "Tool Wear", "value": 190.0, "impact": -45.0},
                    {"feature": "Air Temperature", "value": 301.0, "impact": -3.0},
                    {"feature": "Process Temperature", "value": 322.0, "impact": -24.0}
                ],
                "failureTypes": {"TWF": 1.4, "HDF": 0.3, "XYZ": 0.9}
            }))
        }),
    );
    let addr = serve(scorer).await;
    let config = upstream(None, Some(format!("http://{addr}")), 2_000);
    let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();

    let outcome = orchestrator.predict_traced(&week_request("3")).await;
    assert_eq!(outcome.scored_by, RemoteScorer::NAME);
    assert_eq!(outcome.telemetry_source, LocalSynthesis::NAME);

    let result = outcome.result;
    assert_eq!(result.score, 20.0);
    assert_eq!(result.risk, RiskLevel::Critical);
    assert_ne!(result.explanation, "Everything nominal.");
    let names: Vec<&str> = result.top_features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Tool Wear", "Process Temperature", "Torque"]);

    let types = result.failure_types.unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(types[&FailureMode::ToolWear], 1.0);
}

#[tokio::test]
async fn test_failing_remotes_fall_back() {
    let broken = Router::new()
        .route("/api/v2/telemetry/:id", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/predict", post(|| async { (StatusCode::OK, Json(json!({"unexpected": true}))) }));
    let addr = serve(broken).await;
    let config = upstream(Some(format!("http://{addr}")), Some(format!("http://{addr}")), 2_000);
    let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();

    let outcome = orchestrator.predict_traced(&week_request("1")).await;
    assert_eq!(outcome.telemetry_source, LocalSynthesis::NAME);
    assert_eq!(outcome.scored_by, LocalScoring::NAME);
}

#[tokio::test]
async fn test_slow_remote_times_out() {
    let slow = Router::new().route(
        "/predict",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Json(Value::Null)
        }),
    );
    let addr = serve(slow).await;
    let config = upstream(None, Some(format!("http://{addr}")), 200);
    let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();

    let started = std::time::Instant::now();
    let outcome = orchestrator.predict_traced(&week_request("5")).await;
    assert_eq!(outcome.scored_by, LocalScoring::NAME);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_remote_reply_without_features_falls_back() {
    let bare = Router::new().route("/predict", post(|| async { Json(json!({"score": 55.0})) }));
    let addr = serve(bare).await;
    let config = upstream(None, Some(format!("http://{addr}")), 2_000);
    let orchestrator = FallbackOrchestrator::from_config(&config).unwrap();

    let outcome = orchestrator.predict_traced(&week_request("2")).await;
    assert_eq!(outcome.scored_by, LocalScoring::NAME);
    assert_eq!(outcome.result.top_features.len(), 3);
    assert!(outcome.result.failure_types.is_some());
}
