//! Prediction ledger: append-only history of recorded predictions.

use chrono::{NaiveDate, Utc};
use std::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::{read_or_recover, write_or_recover};
use crate::config::defaults::DEFAULT_MODEL_VERSION;
use crate::error::EngineError;
use crate::types::{NewPrediction, PredictionRecord, RiskLevel};

/// Filter for [`PredictionLedger::list`]. Absent fields match everything;
/// date bounds compare `predictionDate` inclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionFilter {
    pub machine_id: Option<String>,
    pub risk: Option<RiskLevel>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PredictionFilter {
    pub fn matches(&self, record: &PredictionRecord) -> bool {
        self.machine_id.as_ref().map_or(true, |id| &record.machine_id == id)
            && self.risk.map_or(true, |r| record.result.risk == r)
            && self.start_date.map_or(true, |d| record.prediction_date >= d)
            && self.end_date.map_or(true, |d| record.prediction_date <= d)
    }
}

#[derive(Debug, Default)]
pub struct PredictionLedger {
    pub(super) records: RwLock<Vec<PredictionRecord>>,
}

impl PredictionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a prediction, assigning its id and `createdAt`.
    ///
    /// The stored risk is always the tier of the stored score.
    pub fn record(&self, new: NewPrediction) -> Result<PredictionRecord, EngineError> {
        if new.machine_id.trim().is_empty() {
            return Err(EngineError::validation("machineId", "machineId is required"));
        }
        if new.machine_name.trim().is_empty() {
            return Err(EngineError::validation("machineName", "machineName is required"));
        }

        let mut result = new.result;
        if !result.score.is_finite() || !(0.0..=100.0).contains(&result.score) {
            return Err(EngineError::validation("score", "score must be between 0 and 100"));
        }
        let risk = RiskLevel::from_score(result.score);
        if risk != result.risk {
            warn!(
                machine_id = %new.machine_id,
                score = result.score,
                claimed = %result.risk,
                derived = %risk,
                "Recorded risk disagrees with score, using derived tier"
            );
            result.risk = risk;
        }

        let record = PredictionRecord {
            id: format!("pred-{}", Uuid::new_v4().simple()),
            machine_id: new.machine_id,
            machine_name: new.machine_name,
            prediction_date: new.prediction_date,
            result,
            created_at: Utc::now(),
            user_id: new.user_id,
            user_email: new.user_email,
            model_version: new
                .model_version
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
        };

        write_or_recover(&self.records, "ledger").push(record.clone());
        info!(id = %record.id, machine_id = %record.machine_id, risk = %record.result.risk, "Prediction recorded");
        Ok(record)
    }

    /// Matching records, newest `createdAt` first. Records sharing a
    /// timestamp list most recently appended first.
    pub fn list(&self, filter: &PredictionFilter) -> Vec<PredictionRecord> {
        let mut matched: Vec<PredictionRecord> = read_or_recover(&self.records, "ledger")
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }

    pub fn len(&self) -> usize {
        read_or_recover(&self.records, "ledger").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
