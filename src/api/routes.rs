//! API route table.

use axum::routing::{get, patch, post};
use axum::Router;

use super::handlers::{self, DashboardState};

/// Build the v2 API router.
pub fn v2_api_routes(state: DashboardState) -> Router {
    Router::new()
        // Machines
        .route("/machines", get(handlers::list_machines))
        .route("/machines/:id/predict", get(handlers::predict))
        .route("/telemetry/:id", get(handlers::get_telemetry))
        // Scoring service
        .route("/ml/predict", post(handlers::ml_predict))
        // Prediction ledger
        .route("/predictions", get(handlers::list_predictions).post(handlers::record_prediction))
        // Alerts
        .route("/alerts", get(handlers::list_alerts).post(handlers::create_alert))
        .route("/alerts/:id/acknowledge", patch(handlers::acknowledge_alert))
        // Demo data
        .route("/seed", post(handlers::seed))
        .with_state(state)
}

/// Liveness endpoint at root level.
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}
