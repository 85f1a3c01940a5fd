//! Alert lifecycle and prediction ledger under concurrent use.

use pdm_engine::storage::{AlertFilter, PredictionFilter};
use pdm_engine::types::{Acknowledger, NewAlert, NewPrediction};
use pdm_engine::{
    scoring, AlertStatus, EngineError, FallbackOrchestrator, PredictionRequest, RiskLevel, Store,
    TelemetryInput, TelemetryWindow,
};

use chrono::NaiveDate;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn maintenance() -> Acknowledger {
    Acknowledger {
        id: "2".into(),
        email: "maintenance@example.com".into(),
        role: "MAINTENANCE".into(),
    }
}

fn worn_telemetry() -> TelemetryInput {
    TelemetryInput {
        process_temperature: Some(318.0),
        tool_wear: Some(90.0),
        torque: Some(24.0),
        ..TelemetryInput::default()
    }
}

fn prediction_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
}

fn high_risk_alert() -> NewAlert {
    let prediction = scoring::score("2", &worn_telemetry());
    NewAlert::from_prediction("2", "Machine B - Production Line 2", &prediction, prediction_date()).unwrap()
}

#[test]
fn test_alert_from_high_prediction_is_acknowledged_once() {
    let store = Store::new();
    let prediction = scoring::score("2", &worn_telemetry());
    // 16 K over the limit costs 16, 90 min of wear 45, 6 Nm under the floor 6.
    assert_eq!(prediction.score, 33.0);
    assert_eq!(prediction.risk, RiskLevel::High);

    let alert = store.alerts().create(high_risk_alert()).unwrap();
    assert_eq!(alert.status, AlertStatus::Active);
    assert_eq!(alert.title, "High Risk Alert: Machine B - Production Line 2");
    assert!(alert.description.ends_with("(Score: 33)"));

    let acked = store.alerts().acknowledge(&alert.id, maintenance()).unwrap();
    assert_eq!(acked.status, AlertStatus::Acknowledged);
    assert_eq!(acked.acknowledged_by, Some(maintenance()));
    assert!(acked.acknowledged_at.unwrap() >= acked.created_at);

    let err = store.alerts().acknowledge(&alert.id, maintenance()).unwrap_err();
    assert!(matches!(err, EngineError::Conflict { status: AlertStatus::Acknowledged, .. }));
    assert!(err.to_string().contains("acknowledged"));
    assert_eq!(store.alerts().get(&alert.id).unwrap(), acked);
}

#[test]
fn test_orchestrated_prediction_feeds_ledger_and_alerts() {
    let store = Store::new();
    let orchestrator = FallbackOrchestrator::local_only(Duration::from_secs(1));
    let window = TelemetryWindow::parse(Some("2024-01-01"), Some("2024-01-08")).unwrap();
    let request = PredictionRequest::new("4", window);

    let result = tokio_test::block_on(orchestrator.predict(&request));
    let record = store
        .ledger()
        .record(NewPrediction {
            machine_id: "4".into(),
            machine_name: "Machine D - Quality Control".into(),
            prediction_date: prediction_date(),
            user_id: Some("2".into()),
            user_email: Some("maintenance@example.com".into()),
            model_version: None,
            result: result.clone(),
        })
        .unwrap();
    assert_eq!(record.result, result);
    assert_eq!(record.model_version, "1.0.0");

    let raised = NewAlert::from_prediction("4", &record.machine_name, &record.result, record.prediction_date);
    assert_eq!(raised.is_some(), result.risk >= RiskLevel::High);
    if let Some(new) = raised {
        let alert = store.alerts().create(new).unwrap();
        assert_eq!(alert.risk, result.risk);
        assert_eq!(alert.status, AlertStatus::Active);
    }
}

#[test]
fn test_medium_prediction_raises_no_alert() {
    let telemetry = TelemetryInput { tool_wear: Some(60.0), ..TelemetryInput::default() };
    let prediction = scoring::score("1", &telemetry);
    assert_eq!(prediction.risk, RiskLevel::Medium);
    assert!(NewAlert::from_prediction("1", "Machine A", &prediction, prediction_date()).is_none());
}

#[test]
fn test_concurrent_acknowledge_has_single_winner() {
    let store = Arc::new(Store::new());
    let alert = store.alerts().create(high_risk_alert()).unwrap();

    let results: Vec<Result<_, EngineError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = &store;
                let id = alert.id.clone();
                s.spawn(move || {
                    let by = Acknowledger {
                        id: i.to_string(),
                        email: format!("user{i}@example.com"),
                        role: "MAINTENANCE".into(),
                    };
                    store.alerts().acknowledge(&id, by)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, EngineError::Conflict { .. })));

    let stored = store.alerts().get(&alert.id).unwrap();
    assert_eq!(&stored, winners[0]);
}

#[test]
fn test_concurrent_ledger_appends_are_all_kept() {
    let store = Arc::new(Store::new());

    thread::scope(|s| {
        for worker in 0..8 {
            let store = &store;
            s.spawn(move || {
                for n in 0..25 {
                    let machine_id = ((worker % 3) + 1).to_string();
                    let telemetry = TelemetryInput { tool_wear: Some(f64::from(n * 4)), ..TelemetryInput::default() };
                    store
                        .ledger()
                        .record(NewPrediction {
                            machine_name: format!("Machine {machine_id}"),
                            result: scoring::score(&machine_id, &telemetry),
                            machine_id,
                            prediction_date: prediction_date(),
                            user_id: None,
                            user_email: None,
                            model_version: None,
                        })
                        .unwrap();
                }
            });
        }
    });

    let all = store.ledger().list(&PredictionFilter::default());
    assert_eq!(all.len(), 200);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let mut ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 200);

    for record in &all {
        assert_eq!(record.result.risk, RiskLevel::from_score(record.result.score));
    }

    let machine_one = store.ledger().list(&PredictionFilter {
        machine_id: Some("1".into()),
        ..PredictionFilter::default()
    });
    // Workers 0, 3 and 6 write machine 1.
    assert_eq!(machine_one.len(), 75);
}

#[test]
fn test_reseed_during_reads_is_consistent() {
    let store = Arc::new(Store::new());
    store.alerts().create(high_risk_alert()).unwrap();

    thread::scope(|s| {
        let reader = {
            let store = &store;
            s.spawn(move || {
                for _ in 0..200 {
                    let n = store.alerts().list(&AlertFilter::default()).len();
                    assert!(n == 1 || n == 2, "saw {n} alerts");
                }
            })
        };
        s.spawn(|| {
            store.reseed(chrono::Utc::now());
        });
        reader.join().unwrap();
    });

    assert_eq!(store.ledger().len(), 3);
    assert_eq!(store.alerts().len(), 2);
}
