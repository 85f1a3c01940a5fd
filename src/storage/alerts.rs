//! Alert lifecycle: creation, listing and acknowledgment.

use chrono::Utc;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{read_or_recover, write_or_recover};
use crate::error::EngineError;
use crate::types::{Acknowledger, Alert, AlertStatus, NewAlert, RiskLevel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub risk: Option<RiskLevel>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.status.map_or(true, |s| alert.status == s) && self.risk.map_or(true, |r| alert.risk == r)
    }
}

#[derive(Debug, Default)]
pub struct AlertLifecycle {
    pub(super) alerts: RwLock<Vec<Alert>>,
}

impl AlertLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a new alert. New alerts are always `active`, whatever their risk.
    pub fn create(&self, new: NewAlert) -> Result<Alert, EngineError> {
        new.validate()?;

        let alert = Alert {
            id: format!("alert-{}", Uuid::new_v4().simple()),
            machine_id: new.machine_id,
            machine_name: new.machine_name,
            title: new.title,
            description: new.description,
            risk: new.risk,
            score: new.score,
            status: AlertStatus::Active,
            created_at: Utc::now(),
            acknowledged_at: None,
            acknowledged_by: None,
            prediction_date: new.prediction_date,
        };

        write_or_recover(&self.alerts, "alerts").push(alert.clone());
        info!(id = %alert.id, machine_id = %alert.machine_id, risk = %alert.risk, "Alert created");
        Ok(alert)
    }

    /// Move an active alert to `acknowledged`.
    ///
    /// The status check and the update happen under one write lock, so of
    /// several concurrent acknowledgments exactly one succeeds; the rest get
    /// [`EngineError::Conflict`] and the record is left as the winner wrote it.
    pub fn acknowledge(&self, id: &str, by: Acknowledger) -> Result<Alert, EngineError> {
        if [&by.id, &by.email, &by.role].iter().any(|f| f.trim().is_empty()) {
            return Err(EngineError::validation("acknowledgedBy", "Missing user information"));
        }

        let mut alerts = write_or_recover(&self.alerts, "alerts");
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::not_found(format!("Alert {id}")))?;

        if !alert.status.can_transition_to(AlertStatus::Acknowledged) {
            return Err(EngineError::Conflict { id: id.to_string(), status: alert.status });
        }

        let now = Utc::now().max(alert.created_at);
        alert.status = AlertStatus::Acknowledged;
        alert.acknowledged_at = Some(now);
        alert.acknowledged_by = Some(by);
        let updated = alert.clone();
        drop(alerts);

        info!(
            id = %updated.id,
            by = updated.acknowledged_by.as_ref().map_or("", |b| b.email.as_str()),
            "Alert acknowledged"
        );
        Ok(updated)
    }

    pub fn get(&self, id: &str) -> Option<Alert> {
        read_or_recover(&self.alerts, "alerts").iter().find(|a| a.id == id).cloned()
    }

    /// Matching alerts, newest `createdAt` first.
    pub fn list(&self, filter: &AlertFilter) -> Vec<Alert> {
        let mut matched: Vec<Alert> = read_or_recover(&self.alerts, "alerts")
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }

    pub fn len(&self) -> usize {
        read_or_recover(&self.alerts, "alerts").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
