//! PdM Engine: Predictive-Maintenance Telemetry & Health Scoring
//!
//! Backend for a machine-health dashboard.
//!
//! ## Architecture
//!
//! - **Telemetry**: Synthesizes sensor readings per machine and window
//! - **Scoring**: Penalty-model health score, risk tier and feature attribution
//! - **Orchestrator**: Remote telemetry/scoring with local fallback
//! - **Storage**: Prediction ledger and alert lifecycle
//! - **API**: axum v2 endpoints

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod scoring;
pub mod storage;
pub mod telemetry;
pub mod types;
pub mod upstream;

pub use config::EngineConfig;
pub use error::EngineError;
pub use orchestrator::{FallbackOrchestrator, PredictionRequest};
pub use storage::Store;

// Re-export commonly used types
pub use types::{
    Alert, AlertStatus, FailureMode, FeatureImpact, PredictionRecord, PredictionResult,
    RiskLevel, TelemetryInput, TelemetrySnapshot, TelemetryWindow,
};
