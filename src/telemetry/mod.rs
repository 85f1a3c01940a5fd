//! Telemetry synthesis
//!
//! Produces plausible sensor readings for a machine over an observation
//! window when no telemetry service is reachable.

mod profiles;
mod synthesizer;

pub use profiles::*;
pub use synthesizer::*;
