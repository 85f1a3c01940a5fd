//! Lenient wire form of a remote scoring response and its adapter.
//!
//! Remote scorers are trusted for the score and attributions only. The risk
//! tier is always re-derived from the score, failure probabilities are
//! clamped to `[0, 1]` and unknown failure codes are dropped.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::UpstreamError;
use crate::scoring::templates;
use crate::types::{
    FailureMode, FailureTypes, FeatureImpact, FeatureResponsibility, PredictionResult, RiskLevel,
};

/// Features kept from a remote response.
const REMOTE_TOP_FEATURES: usize = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteShapFeature {
    pub feature: String,
    pub value: f64,
    pub impact: f64,
}

impl RemoteShapFeature {
    fn describe(&self) -> String {
        if self.impact < 0.0 {
            format!(
                "{}: {:.2} - Contributing to failure risk ({:.1}% impact)",
                self.feature,
                self.value,
                self.impact.abs()
            )
        } else {
            format!(
                "{}: {:.2} - Normal/healthy indicator ({:.1}% impact)",
                self.feature, self.value, self.impact
            )
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteScore {
    pub score: f64,
    #[serde(default)]
    pub risk: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    pub shap_features: Vec<RemoteShapFeature>,
    #[serde(default, alias = "failureTypeProbabilities")]
    pub failure_types: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub feature_responsibilities: Option<Vec<Value>>,
}

impl RemoteScore {
    /// Adapt into the dashboard prediction shape.
    ///
    /// The remote explanation is kept only when the remote's own tier agrees
    /// with the re-derived one; otherwise the tier template is used. A reply
    /// with fewer than three finite features is malformed.
    pub fn into_prediction(self, machine_id: &str) -> Result<PredictionResult, UpstreamError> {
        if !self.score.is_finite() {
            return Err(UpstreamError::Malformed(format!("non-finite score {}", self.score)));
        }
        let score = self.score.clamp(0.0, 100.0);
        let risk = RiskLevel::from_score(score);

        let claimed_risk = self.risk.as_deref().and_then(|r| r.parse::<RiskLevel>().ok());
        let explanation = match self.explanation {
            Some(text) if claimed_risk == Some(risk) && !text.trim().is_empty() => text,
            _ => templates::assessment(risk, machine_id),
        };

        let mut shap = self.shap_features;
        shap.retain(|f| f.impact.is_finite() && f.value.is_finite());
        if shap.len() < REMOTE_TOP_FEATURES {
            return Err(UpstreamError::Malformed(format!(
                "expected at least {REMOTE_TOP_FEATURES} features, got {}",
                shap.len()
            )));
        }
        shap.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
        let top_features = shap
            .iter()
            .take(REMOTE_TOP_FEATURES)
            .map(|f| FeatureImpact {
                name: f.feature.clone(),
                impact: f.impact,
                description: f.describe(),
            })
            .collect();

        let failure_types = self.failure_types.map(|raw| {
            raw.into_iter()
                .filter_map(|(code, p)| {
                    let mode = FailureMode::ALL.into_iter().find(|m| m.code() == code)?;
                    p.is_finite().then(|| (mode, p.clamp(0.0, 1.0)))
                })
                .collect::<FailureTypes>()
        });

        let feature_responsibilities = self.feature_responsibilities.map(|raw| {
            raw.into_iter()
                .filter_map(|v| serde_json::from_value::<FeatureResponsibility>(v).ok())
                .collect()
        });

        Ok(PredictionResult {
            score,
            risk,
            explanation,
            top_features,
            failure_types,
            feature_responsibilities,
        })
    }
}
