//! v2 API handlers: envelope responses, camelCase bodies, ISO-8601 timestamps.
//!
//! Handlers return `Result<Response, EngineError>`; errors render through the
//! error envelope.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::envelope::ApiResponse;
use crate::error::EngineError;
use crate::orchestrator::{FallbackOrchestrator, PredictionRequest};
use crate::scoring;
use crate::storage::{AlertFilter, PredictionFilter, Store};
use crate::telemetry::{self, catalog};
use crate::types::{
    parse_date, Acknowledger, Alert, AlertStatus, FailureTypes, FeatureImpact,
    FeatureResponsibility, NewAlert, NewPrediction, PredictionRecord, PredictionResult, RiskLevel,
    TelemetryInput, TelemetrySnapshot, TelemetryWindow,
};

type ApiResult = Result<Response, EngineError>;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct DashboardState {
    pub store: Arc<Store>,
    pub orchestrator: Arc<FallbackOrchestrator>,
    pub model_version: String,
}

impl DashboardState {
    pub fn new(store: Arc<Store>, orchestrator: Arc<FallbackOrchestrator>, model_version: impl Into<String>) -> Self {
        Self { store, orchestrator, model_version: model_version.into() }
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, EngineError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| EngineError::validation("body", e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, EngineError> {
    params
        .map(|Query(v)| v)
        .map_err(|e| EngineError::validation("query", e.body_text()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn require(field: &'static str, value: Option<String>) -> Result<String, EngineError> {
    non_blank(value).ok_or_else(|| EngineError::validation(field, format!("{field} is required")))
}

fn parse_risk(raw: Option<String>) -> Result<Option<RiskLevel>, EngineError> {
    non_blank(raw)
        .map(|r| r.parse::<RiskLevel>().map_err(|e| EngineError::validation("risk", e.to_string())))
        .transpose()
}

fn parse_date_field(field: &'static str, raw: Option<String>) -> Result<Option<NaiveDate>, EngineError> {
    non_blank(raw)
        .map(|d| {
            parse_date(&d)
                .ok_or_else(|| EngineError::validation(field, format!("{field} '{d}' is not a valid date")))
        })
        .transpose()
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub model_version: String,
    pub predictions: usize,
    pub alerts: usize,
}

/// GET /health
pub async fn health(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_version: state.model_version.clone(),
        predictions: state.store.ledger().len(),
        alerts: state.store.alerts().len(),
    })
}

/// GET /api/v2/machines
pub async fn list_machines() -> Response {
    ApiResponse::ok(catalog())
}

// ============================================================================
// Prediction & telemetry
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> Result<TelemetryWindow, EngineError> {
        TelemetryWindow::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// GET /api/v2/machines/:id/predict?startDate&endDate
pub async fn predict(
    State(state): State<DashboardState>,
    Path(machine_id): Path<String>,
    params: Result<Query<WindowQuery>, QueryRejection>,
) -> ApiResult {
    let window = query(params)?.window()?;
    let request = PredictionRequest::new(machine_id, window);
    let result = state.orchestrator.predict(&request).await;
    Ok(ApiResponse::ok(result))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryResponse {
    pub machine_id: String,
    pub telemetry: TelemetrySnapshot,
    pub date_range: DateRange,
}

/// GET /api/v2/telemetry/:id?startDate&endDate
pub async fn get_telemetry(
    Path(machine_id): Path<String>,
    params: Result<Query<WindowQuery>, QueryRejection>,
) -> ApiResult {
    let window = query(params)?.window()?;
    let telemetry = telemetry::synthesize(&machine_id, &window);
    Ok(ApiResponse::ok(TelemetryResponse {
        machine_id,
        telemetry,
        date_range: DateRange { start_date: window.start, end_date: window.end },
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub machine_id: Option<String>,
    #[serde(default)]
    pub telemetry: TelemetryInput,
}

/// POST /api/v2/ml/predict
pub async fn ml_predict(
    State(state): State<DashboardState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> ApiResult {
    let request = body(payload)?;
    let machine_id = require("machineId", request.machine_id)?;
    let response = scoring::score_enriched(&machine_id, &request.telemetry, &state.model_version, Utc::now());
    Ok(ApiResponse::ok(response))
}

// ============================================================================
// Prediction ledger
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionQuery {
    pub machine_id: Option<String>,
    pub risk: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionList {
    pub predictions: Vec<PredictionRecord>,
    pub total: usize,
}

/// GET /api/v2/predictions?machineId&risk&startDate&endDate
pub async fn list_predictions(
    State(state): State<DashboardState>,
    params: Result<Query<PredictionQuery>, QueryRejection>,
) -> ApiResult {
    let q = query(params)?;
    let filter = PredictionFilter {
        machine_id: non_blank(q.machine_id),
        risk: parse_risk(q.risk)?,
        start_date: parse_date_field("startDate", q.start_date)?,
        end_date: parse_date_field("endDate", q.end_date)?,
    };
    let predictions = state.store.ledger().list(&filter);
    let total = predictions.len();
    Ok(ApiResponse::ok(PredictionList { predictions, total }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPredictionRequest {
    pub machine_id: Option<String>,
    pub machine_name: Option<String>,
    pub prediction_date: Option<String>,
    pub score: Option<f64>,
    pub risk: Option<String>,
    pub explanation: Option<String>,
    pub top_features: Option<Vec<FeatureImpact>>,
    #[serde(default, alias = "failureTypeProbabilities")]
    pub failure_types: Option<FailureTypes>,
    #[serde(default)]
    pub feature_responsibilities: Option<Vec<FeatureResponsibility>>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub model_version: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictionCreated {
    pub message: &'static str,
    pub prediction: PredictionRecord,
}

/// POST /api/v2/predictions
pub async fn record_prediction(
    State(state): State<DashboardState>,
    payload: Result<Json<RecordPredictionRequest>, JsonRejection>,
) -> ApiResult {
    let req = body(payload)?;
    let machine_id = require("machineId", req.machine_id)?;
    let machine_name = require("machineName", req.machine_name)?;
    let prediction_date = parse_date_field("predictionDate", req.prediction_date)?
        .ok_or_else(|| EngineError::validation("predictionDate", "predictionDate is required"))?;
    let score = req.score.ok_or_else(|| EngineError::validation("score", "score is required"))?;
    let risk = parse_risk(req.risk)?.ok_or_else(|| EngineError::validation("risk", "risk is required"))?;
    let explanation = require("explanation", req.explanation)?;
    let top_features = req
        .top_features
        .filter(|features| !features.is_empty())
        .ok_or_else(|| EngineError::validation("topFeatures", "topFeatures is required"))?;

    let new = NewPrediction {
        machine_name,
        machine_id,
        prediction_date,
        user_id: non_blank(req.user_id),
        user_email: non_blank(req.user_email),
        model_version: non_blank(req.model_version).or_else(|| Some(state.model_version.clone())),
        result: PredictionResult {
            score,
            risk,
            explanation,
            top_features,
            failure_types: req.failure_types,
            feature_responsibilities: req.feature_responsibilities,
        },
    };

    let prediction = state.store.ledger().record(new)?;
    Ok(ApiResponse::created(PredictionCreated {
        message: "Prediction recorded successfully",
        prediction,
    }))
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub status: Option<String>,
    pub risk: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertList {
    pub alerts: Vec<Alert>,
    pub total: usize,
}

/// GET /api/v2/alerts?status&risk
pub async fn list_alerts(
    State(state): State<DashboardState>,
    params: Result<Query<AlertQuery>, QueryRejection>,
) -> ApiResult {
    let q = query(params)?;
    let filter = AlertFilter {
        status: non_blank(q.status).map(|s| s.parse::<AlertStatus>()).transpose()?,
        risk: parse_risk(q.risk)?,
    };
    let alerts = state.store.alerts().list(&filter);
    let total = alerts.len();
    Ok(ApiResponse::ok(AlertList { alerts, total }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub machine_id: Option<String>,
    pub machine_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub risk: Option<String>,
    pub score: Option<f64>,
    pub prediction_date: Option<String>,
}

impl TryFrom<CreateAlertRequest> for NewAlert {
    type Error = EngineError;

    fn try_from(req: CreateAlertRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            machine_id: require("machineId", req.machine_id)?,
            machine_name: require("machineName", req.machine_name)?,
            title: require("title", req.title)?,
            description: require("description", req.description)?,
            risk: parse_risk(req.risk)?
                .ok_or_else(|| EngineError::validation("risk", "risk is required"))?,
            score: req.score.ok_or_else(|| EngineError::validation("score", "score is required"))?,
            prediction_date: parse_date_field("predictionDate", req.prediction_date)?
                .ok_or_else(|| EngineError::validation("predictionDate", "predictionDate is required"))?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AlertMessage {
    pub message: &'static str,
    pub alert: Alert,
}

/// POST /api/v2/alerts
pub async fn create_alert(
    State(state): State<DashboardState>,
    payload: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> ApiResult {
    let new = NewAlert::try_from(body(payload)?)?;
    let alert = state.store.alerts().create(new)?;
    Ok(ApiResponse::created(AlertMessage { message: "Alert created successfully", alert }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub user_role: Option<String>,
}

/// PATCH /api/v2/alerts/:id/acknowledge
pub async fn acknowledge_alert(
    State(state): State<DashboardState>,
    Path(alert_id): Path<String>,
    payload: Result<Json<AcknowledgeRequest>, JsonRejection>,
) -> ApiResult {
    let req = body(payload)?;
    let missing = || EngineError::validation("acknowledgedBy", "Missing user information");
    let by = Acknowledger {
        id: non_blank(req.user_id).ok_or_else(missing)?,
        email: non_blank(req.user_email).ok_or_else(missing)?,
        role: non_blank(req.user_role).ok_or_else(missing)?,
    };
    let alert = state.store.alerts().acknowledge(&alert_id, by)?;
    Ok(ApiResponse::ok(AlertMessage { message: "Alert acknowledged successfully", alert }))
}

// ============================================================================
// Demo data
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub message: &'static str,
    pub predictions: usize,
    pub alerts: usize,
}

/// POST /api/v2/seed
pub async fn seed(State(state): State<DashboardState>) -> Response {
    let summary = state.store.reseed(Utc::now());
    ApiResponse::ok(SeedResult {
        message: "Demo data seeded successfully",
        predictions: summary.predictions,
        alerts: summary.alerts,
    })
}
