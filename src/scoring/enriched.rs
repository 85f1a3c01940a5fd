//! Scoring-service response: the contract a remote scorer speaks, served
//! locally by `POST /api/v2/ml/predict`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::failure_modes;
use super::health::{attribute, clamp_score, round_to, FeatureVector, Penalties, BASE_SCORE};
use super::templates;
use crate::types::{FailureTypes, FeatureResponsibility, RiskLevel, TelemetryInput};

/// Attributions reported by the scoring service.
pub const SHAP_FEATURES: usize = 6;

/// Probability mass over the four tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskProbabilities {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl RiskProbabilities {
    pub const fn for_tier(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::Low => Self { low: 0.7, medium: 0.2, high: 0.05, critical: 0.0 },
            RiskLevel::Medium => Self { low: 0.2, medium: 0.6, high: 0.2, critical: 0.1 },
            RiskLevel::High => Self { low: 0.1, medium: 0.15, high: 0.6, critical: 0.2 },
            RiskLevel::Critical => Self { low: 0.0, medium: 0.05, high: 0.15, critical: 0.7 },
        }
    }
}

/// One attributed feature. `impact` is in score points, `shap_value` is the
/// same contribution as a fraction of the full score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapFeature {
    pub feature: String,
    pub value: f64,
    pub shap_value: f64,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResponse {
    pub score: f64,
    pub risk: RiskLevel,
    pub probability: RiskProbabilities,
    pub explanation: String,
    pub shap_features: Vec<ShapFeature>,
    pub failure_types: FailureTypes,
    pub feature_responsibilities: Vec<FeatureResponsibility>,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Score telemetry with the scoring-service level of detail.
pub fn score_enriched(
    machine_id: &str,
    telemetry: &TelemetryInput,
    model_version: &str,
    now: DateTime<Utc>,
) -> ScoringResponse {
    let features = FeatureVector::from(telemetry);
    let penalties = Penalties::assess(&features);
    let score = round_to(clamp_score(BASE_SCORE - penalties.total()), 1);
    let risk = RiskLevel::from_score(score);

    let attributions = attribute(&features, &penalties);
    let failure_types = failure_modes::physics_estimate(&features);
    let feature_responsibilities = failure_modes::responsibilities(&attributions, &failure_types);

    let shap_features = attributions
        .iter()
        .take(SHAP_FEATURES)
        .map(|a| ShapFeature {
            feature: a.feature.label().to_string(),
            value: a.value,
            shap_value: round_to(a.impact / BASE_SCORE, 3),
            impact: a.impact,
        })
        .collect();

    ScoringResponse {
        score,
        risk,
        probability: RiskProbabilities::for_tier(risk),
        explanation: templates::condition_summary(risk, machine_id),
        shap_features,
        failure_types,
        feature_responsibilities,
        model_version: model_version.to_string(),
        timestamp: now,
    }
}
