//! Demo dataset written by `POST /api/v2/seed`, dated relative to the call.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::defaults::DEFAULT_MODEL_VERSION;
use crate::types::{
    alert_title, Acknowledger, Alert, AlertStatus, FeatureImpact, PredictionRecord, PredictionResult,
    RiskLevel,
};

struct DemoPrediction {
    machine_id: &'static str,
    machine_name: &'static str,
    score: f64,
    explanation: &'static str,
    features: [(&'static str, f64, &'static str); 3],
    user_id: &'static str,
    user_email: &'static str,
    days_ago: i64,
}

const DEMO_PREDICTIONS: [DemoPrediction; 3] = [
    DemoPrediction {
        machine_id: "1",
        machine_name: "Machine A - Production Line 1",
        score: 92.0,
        explanation: "Machine A shows excellent operational health.",
        features: [
            ("Vibration Analysis", -5.0, "Normal vibration levels"),
            ("Temperature Trends", 8.0, "Optimal temperature range"),
            ("Maintenance History", 10.0, "Recent maintenance completed"),
        ],
        user_id: "3",
        user_email: "manager@example.com",
        days_ago: 7,
    },
    DemoPrediction {
        machine_id: "2",
        machine_name: "Machine B - Production Line 2",
        score: 35.0,
        explanation: "Machine B reveals significant deterioration trends.",
        features: [
            ("Vibration Analysis", -25.0, "Elevated vibration patterns"),
            ("Temperature Trends", -18.0, "Gradual temperature increase"),
            ("Maintenance History", -15.0, "Extended time since maintenance"),
        ],
        user_id: "2",
        user_email: "maintenance@example.com",
        days_ago: 14,
    },
    DemoPrediction {
        machine_id: "3",
        machine_name: "Machine C - Production Line 1",
        score: 85.0,
        explanation: "Machine C indicates excellent operational health.",
        features: [
            ("Vibration Analysis", -3.0, "Normal vibration levels"),
            ("Operational Load", 7.0, "Operating within specifications"),
            ("Oil Quality Index", 9.0, "Oil quality excellent"),
        ],
        user_id: "1",
        user_email: "operator@example.com",
        days_ago: 21,
    },
];

/// Predictions and alerts for the demo dashboard.
pub fn demo_dataset(now: DateTime<Utc>) -> (Vec<PredictionRecord>, Vec<Alert>) {
    let predictions = DEMO_PREDICTIONS
        .iter()
        .map(|p| {
            let created_at = now - Duration::days(p.days_ago);
            PredictionRecord {
                id: format!("pred-{}", Uuid::new_v4().simple()),
                machine_id: p.machine_id.to_string(),
                machine_name: p.machine_name.to_string(),
                prediction_date: created_at.date_naive(),
                result: PredictionResult {
                    score: p.score,
                    risk: RiskLevel::from_score(p.score),
                    explanation: p.explanation.to_string(),
                    top_features: p
                        .features
                        .iter()
                        .map(|&(name, impact, description)| FeatureImpact {
                            name: name.to_string(),
                            impact,
                            description: description.to_string(),
                        })
                        .collect(),
                    failure_types: None,
                    feature_responsibilities: None,
                },
                created_at,
                user_id: Some(p.user_id.to_string()),
                user_email: Some(p.user_email.to_string()),
                model_version: DEFAULT_MODEL_VERSION.to_string(),
            }
        })
        .collect();

    let open_since = now - Duration::days(14);
    let acked_since = now - Duration::days(7);
    let alerts = vec![
        Alert {
            id: format!("alert-{}", Uuid::new_v4().simple()),
            machine_id: "2".into(),
            machine_name: "Machine B - Production Line 2".into(),
            title: alert_title(RiskLevel::High, "Machine B - Production Line 2"),
            description: "Analysis reveals significant deterioration trends. Multiple indicators suggest increased failure risk. (Score: 35)".into(),
            risk: RiskLevel::High,
            score: 35.0,
            status: AlertStatus::Active,
            created_at: open_since,
            acknowledged_at: None,
            acknowledged_by: None,
            prediction_date: open_since.date_naive(),
        },
        Alert {
            id: format!("alert-{}", Uuid::new_v4().simple()),
            machine_id: "4".into(),
            machine_name: "Machine D - Quality Control".into(),
            title: alert_title(RiskLevel::High, "Machine D - Quality Control"),
            description: "Analysis reveals significant deterioration trends. Immediate attention recommended. (Score: 42)".into(),
            risk: RiskLevel::High,
            score: 42.0,
            status: AlertStatus::Acknowledged,
            created_at: acked_since,
            acknowledged_at: Some(acked_since + Duration::days(2)),
            acknowledged_by: Some(Acknowledger {
                id: "2".into(),
                email: "maintenance@example.com".into(),
                role: "MAINTENANCE".into(),
            }),
            prediction_date: acked_since.date_naive(),
        },
    ];

    (predictions, alerts)
}
