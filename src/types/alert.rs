use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PredictionResult, RiskLevel};
use crate::error::EngineError;

/// Alert lifecycle status. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    /// Allowed forward transitions.
    ///
    /// ```text
    /// active ──► acknowledged ──► resolved
    ///    └────────────────────────────▲
    /// ```
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Acknowledged)
                | (Self::Active, Self::Resolved)
                | (Self::Acknowledged, Self::Resolved)
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err(EngineError::validation("status", format!("invalid alert status '{s}'"))),
        }
    }
}

/// Who acknowledged an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledger {
    pub id: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub machine_id: String,
    pub machine_name: String,
    pub title: String,
    pub description: String,
    pub risk: RiskLevel,
    pub score: f64,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_by: Option<Acknowledger>,
    pub prediction_date: NaiveDate,
}

/// Fields required to raise an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub machine_id: String,
    pub machine_name: String,
    pub title: String,
    pub description: String,
    pub risk: RiskLevel,
    pub score: f64,
    pub prediction_date: NaiveDate,
}

impl NewAlert {
    /// Alert for a high or critical prediction, titled the way the dashboard
    /// shows it. Returns `None` for low and medium risk.
    pub fn from_prediction(
        machine_id: &str,
        machine_name: &str,
        prediction: &PredictionResult,
        prediction_date: NaiveDate,
    ) -> Option<Self> {
        if prediction.risk < RiskLevel::High {
            return None;
        }
        Some(Self {
            machine_id: machine_id.to_string(),
            machine_name: machine_name.to_string(),
            title: alert_title(prediction.risk, machine_name),
            description: format!("{} (Score: {})", prediction.explanation, prediction.score),
            risk: prediction.risk,
            score: prediction.score,
            prediction_date,
        })
    }

    /// Reject blank text fields, scores outside `[0, 100]` and a risk that is
    /// not the tier of the score.
    pub fn validate(&self) -> Result<(), EngineError> {
        let required = [
            ("machineId", &self.machine_id),
            ("machineName", &self.machine_name),
            ("title", &self.title),
            ("description", &self.description),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(EngineError::validation(field, format!("{field} is required")));
            }
        }
        if !self.score.is_finite() || !(0.0..=100.0).contains(&self.score) {
            return Err(EngineError::validation("score", "score must be between 0 and 100"));
        }
        let derived = RiskLevel::from_score(self.score);
        if self.risk != derived {
            return Err(EngineError::validation(
                "risk",
                format!("risk '{}' does not match score {} ({derived})", self.risk, self.score),
            ));
        }
        Ok(())
    }
}

/// `"{High|Critical} Risk Alert: {machine name}"`
pub fn alert_title(risk: RiskLevel, machine_name: &str) -> String {
    format!("{} Risk Alert: {machine_name}", risk.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(score: f64) -> PredictionResult {
        PredictionResult {
            score,
            risk: RiskLevel::from_score(score),
            explanation: "Multiple indicators suggest increased failure risk.".into(),
            top_features: Vec::new(),
            failure_types: None,
            feature_responsibilities: None,
        }
    }

    #[test]
    fn test_transitions_only_forward() {
        use AlertStatus::*;
        assert!(Active.can_transition_to(Acknowledged));
        assert!(Active.can_transition_to(Resolved));
        assert!(Acknowledged.can_transition_to(Resolved));
        assert!(!Acknowledged.can_transition_to(Active));
        assert!(!Acknowledged.can_transition_to(Acknowledged));
        assert!(!Resolved.can_transition_to(Active));
        assert!(!Resolved.can_transition_to(Acknowledged));
    }

    #[test]
    fn test_from_prediction_titles() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let high = NewAlert::from_prediction("2", "Machine B - Production Line 2", &prediction(35.0), date).unwrap();
        assert_eq!(high.title, "High Risk Alert: Machine B - Production Line 2");
        assert!(high.description.ends_with("(Score: 35)"));

        let critical = NewAlert::from_prediction("4", "Machine D - Quality Control", &prediction(12.5), date).unwrap();
        assert_eq!(critical.title, "Critical Risk Alert: Machine D - Quality Control");
        assert!(critical.description.ends_with("(Score: 12.5)"));

        assert!(NewAlert::from_prediction("1", "Machine A", &prediction(60.0), date).is_none());
    }

    #[test]
    fn test_validate_rejects_blank_and_out_of_range() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut alert = NewAlert::from_prediction("2", "Machine B", &prediction(35.0), date).unwrap();
        assert!(alert.validate().is_ok());

        alert.title = "  ".into();
        assert!(matches!(alert.validate(), Err(EngineError::Validation { field: "title", .. })));

        alert.title = "t".into();
        alert.score = 120.0;
        assert!(matches!(alert.validate(), Err(EngineError::Validation { field: "score", .. })));
    }

    #[test]
    fn test_validate_rejects_risk_that_disagrees_with_score() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let mut alert = NewAlert::from_prediction("2", "Machine B", &prediction(35.0), date).unwrap();

        alert.risk = RiskLevel::Critical;
        alert.score = 95.0;
        let err = alert.validate().unwrap_err();
        assert!(matches!(err, EngineError::Validation { field: "risk", .. }));
        assert!(err.to_string().contains("(low)"));

        alert.score = 24.0;
        assert!(alert.validate().is_ok());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Acknowledged".parse::<AlertStatus>().unwrap(), AlertStatus::Acknowledged);
        assert!("closed".parse::<AlertStatus>().is_err());
    }
}
