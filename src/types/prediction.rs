use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::RiskLevel;

/// One contributing feature in a prediction, signed impact in percent.
///
/// Negative impact pushes toward failure; positive impact is a healthy signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub name: String,
    pub impact: f64,
    pub description: String,
}

/// Failure-mode codes from the AI4I classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    /// Tool wear failure
    #[serde(rename = "TWF")]
    ToolWear,
    /// Heat dissipation failure
    #[serde(rename = "HDF")]
    HeatDissipation,
    /// Power failure
    #[serde(rename = "PWF")]
    Power,
    /// Overstrain failure
    #[serde(rename = "OSF")]
    Overstrain,
    /// Random failure
    #[serde(rename = "RNF")]
    Random,
}

impl FailureMode {
    pub const ALL: [Self; 5] = [
        Self::ToolWear,
        Self::HeatDissipation,
        Self::Power,
        Self::Overstrain,
        Self::Random,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::ToolWear => "TWF",
            Self::HeatDissipation => "HDF",
            Self::Power => "PWF",
            Self::Overstrain => "OSF",
            Self::Random => "RNF",
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure-mode → probability in `[0, 1]`.
pub type FailureTypes = BTreeMap<FailureMode, f64>;

/// A feature's share of blame for one failure mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsibility {
    pub failure_type: FailureMode,
    pub probability: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureResponsibility {
    pub feature: String,
    pub value: f64,
    #[serde(default)]
    pub responsible_for: Vec<Responsibility>,
}

/// Scored health assessment for one machine and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub score: f64,
    pub risk: RiskLevel,
    pub explanation: String,
    pub top_features: Vec<FeatureImpact>,
    #[serde(
        default,
        alias = "failureTypeProbabilities",
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_types: Option<FailureTypes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_responsibilities: Option<Vec<FeatureResponsibility>>,
}

/// Context attached to a prediction when it is written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub machine_id: String,
    pub machine_name: String,
    pub prediction_date: NaiveDate,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub model_version: Option<String>,
    pub result: PredictionResult,
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: String,
    pub machine_id: String,
    pub machine_name: String,
    pub prediction_date: NaiveDate,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub model_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> PredictionResult {
        PredictionResult {
            score: 35.0,
            risk: RiskLevel::High,
            explanation: "x".into(),
            top_features: vec![FeatureImpact {
                name: "Tool Wear".into(),
                impact: -25.0,
                description: "worn".into(),
            }],
            failure_types: Some(FailureTypes::from([(FailureMode::ToolWear, 0.2)])),
            feature_responsibilities: None,
        }
    }

    #[test]
    fn test_result_wire_shape() {
        let v = serde_json::to_value(sample_result()).unwrap();
        assert_eq!(v["risk"], "high");
        assert_eq!(v["topFeatures"][0]["name"], "Tool Wear");
        assert_eq!(v["failureTypes"]["TWF"], 0.2);
        assert!(v.get("featureResponsibilities").is_none());
    }

    #[test]
    fn test_failure_type_alias_accepted() {
        let body = serde_json::json!({
            "score": 80.0,
            "risk": "low",
            "explanation": "ok",
            "topFeatures": [],
            "failureTypeProbabilities": {"HDF": 0.1, "RNF": 0.02}
        });
        let parsed: PredictionResult = serde_json::from_value(body).unwrap();
        let types = parsed.failure_types.unwrap();
        assert_eq!(types[&FailureMode::HeatDissipation], 0.1);
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_record_flattens_result() {
        let record = PredictionRecord {
            id: "pred-1".into(),
            machine_id: "2".into(),
            machine_name: "Machine B - Production Line 2".into(),
            prediction_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            result: sample_result(),
            created_at: Utc::now(),
            user_id: None,
            user_email: None,
            model_version: "1.0.0".into(),
        };
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["machineId"], "2");
        assert_eq!(v["score"], 35.0);
        assert_eq!(v["predictionDate"], "2024-01-08");
        assert!(v.get("userId").is_none());
    }
}
