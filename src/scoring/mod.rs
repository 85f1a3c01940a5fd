//! Health scoring
//!
//! A penalty model turns telemetry into a 0-100 health score, a risk tier,
//! signed feature attributions and templated explanations. Two output shapes
//! share the model:
//!
//! - [`score`]: dashboard prediction with the top three features
//! - [`score_enriched`]: scorer-service response with risk probabilities,
//!   up to six attributions and a physics-based failure-mode estimate

mod enriched;
pub mod failure_modes;
mod health;
pub mod templates;

pub use enriched::*;
pub use health::*;
