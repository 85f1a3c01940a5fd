//! Upstream telemetry and scoring services
//!
//! HTTP clients for the optional remote stages of the prediction pipeline,
//! plus the adapter that turns a remote scoring response into a
//! [`PredictionResult`](crate::types::PredictionResult).

mod client;
mod remote_score;

pub use client::*;
pub use remote_score::*;
