//! Shared data structures for the predictive-maintenance engine
//!
//! - Telemetry: snapshots, optional scorer input, observation windows
//! - Prediction: risk tiers, feature impacts, failure-type maps, ledger records
//! - Alert: lifecycle status and acknowledgment metadata

mod alert;
mod dates;
mod prediction;
mod risk;
mod telemetry;

pub use alert::*;
pub use dates::*;
pub use prediction::*;
pub use risk::*;
pub use telemetry::*;
