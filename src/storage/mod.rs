//! In-memory persistence for predictions and alerts
//!
//! Both collections live for the process lifetime inside one [`Store`].
//! Reads copy out of the lock; writers hold the write lock only for the
//! append or transition itself.
//!
//! Lock order when both are needed (reseed): ledger, then alerts.

mod alerts;
mod ledger;
pub mod seed;

pub use alerts::*;
pub use ledger::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

/// Owner of the prediction ledger and the alert lifecycle.
#[derive(Debug, Default)]
pub struct Store {
    ledger: PredictionLedger,
    alerts: AlertLifecycle,
}

/// Counts written by [`Store::reseed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub predictions: usize,
    pub alerts: usize,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn ledger(&self) -> &PredictionLedger {
        &self.ledger
    }

    pub const fn alerts(&self) -> &AlertLifecycle {
        &self.alerts
    }

    /// Replace both collections with the demo dataset, dated relative to `now`.
    ///
    /// Both write locks are held for the swap, so readers see either the old
    /// pair of collections or the new pair.
    pub fn reseed(&self, now: DateTime<Utc>) -> SeedSummary {
        let (predictions, alerts) = seed::demo_dataset(now);
        let summary = SeedSummary { predictions: predictions.len(), alerts: alerts.len() };

        let mut ledger = write_or_recover(&self.ledger.records, "ledger");
        let mut lifecycle = write_or_recover(&self.alerts.alerts, "alerts");
        *ledger = predictions;
        *lifecycle = alerts;
        drop(lifecycle);
        drop(ledger);

        info!(predictions = summary.predictions, alerts = summary.alerts, "Demo data seeded");
        summary
    }
}

/// Read guard, recovering the data if a writer panicked.
pub(crate) fn read_or_recover<'a, T>(lock: &'a RwLock<T>, name: &str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|e| {
        warn!(collection = name, "Lock poisoned, recovering");
        e.into_inner()
    })
}

/// Write guard, recovering the data if a writer panicked.
pub(crate) fn write_or_recover<'a, T>(lock: &'a RwLock<T>, name: &str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|e| {
        warn!(collection = name, "Lock poisoned, recovering");
        e.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlertStatus;

    #[test]
    fn test_reseed_replaces_collections() {
        let store = Store::new();
        let now = Utc::now();
        assert_eq!(store.reseed(now), SeedSummary { predictions: 3, alerts: 2 });
        assert_eq!(store.ledger().len(), 3);

        // A second reseed replaces rather than appends.
        store.reseed(now);
        assert_eq!(store.ledger().len(), 3);
        let alerts = store.alerts().list(&AlertFilter::default());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts.iter().filter(|a| a.status == AlertStatus::Acknowledged).count(), 1);
    }
}
