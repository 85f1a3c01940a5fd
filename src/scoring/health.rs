//! Penalty model and feature attribution.

use tracing::debug;

use super::templates;
use crate::types::{FeatureImpact, PredictionResult, RiskLevel, TelemetryInput};

// ============================================================================
// Penalty model
// ============================================================================

/// Score before penalties.
pub const BASE_SCORE: f64 = 100.0;
/// Process temperature above this is penalized (K).
pub const PROCESS_TEMPERATURE_LIMIT: f64 = 310.0;
/// Points lost per kelvin above the limit.
pub const PROCESS_TEMPERATURE_WEIGHT: f64 = 2.0;
/// Points lost per minute of tool wear.
pub const TOOL_WEAR_WEIGHT: f64 = 0.5;
/// Vibration above this is penalized.
pub const VIBRATION_LIMIT: f64 = 40.0;
pub const VIBRATION_WEIGHT: f64 = 1.5;
/// Torque below this is penalized (Nm).
pub const TORQUE_FLOOR: f64 = 30.0;
pub const TORQUE_WEIGHT: f64 = 1.0;

/// Number of features in a dashboard prediction.
pub const TOP_FEATURES: usize = 3;

/// Telemetry with scorer defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub air_temperature: f64,
    pub process_temperature: f64,
    pub rotational_speed: f64,
    pub torque: f64,
    pub tool_wear: f64,
    pub vibration: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub machine_type: f64,
}

impl FeatureVector {
    pub const DEFAULTS: Self = Self {
        air_temperature: 300.0,
        process_temperature: 310.0,
        rotational_speed: 1500.0,
        torque: 40.0,
        tool_wear: 0.0,
        vibration: 40.0,
        pressure: 100.0,
        humidity: 50.0,
        machine_type: 0.0,
    };
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::DEFAULTS
    }
}

impl From<&TelemetryInput> for FeatureVector {
    fn from(t: &TelemetryInput) -> Self {
        let d = Self::DEFAULTS;
        Self {
            air_temperature: t.air_temperature.unwrap_or(d.air_temperature),
            process_temperature: t.process_temperature.unwrap_or(d.process_temperature),
            rotational_speed: t.rotational_speed.unwrap_or(d.rotational_speed),
            torque: t.torque.unwrap_or(d.torque),
            tool_wear: t.tool_wear.unwrap_or(d.tool_wear),
            vibration: t.vibration.unwrap_or(d.vibration),
            pressure: t.pressure.unwrap_or(d.pressure),
            humidity: t.humidity.unwrap_or(d.humidity),
            machine_type: t.machine_type.unwrap_or(d.machine_type),
        }
    }
}

/// Candidate features for attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    ProcessTemperature,
    ToolWear,
    Vibration,
    Torque,
    RotationalSpeed,
    AirTemperature,
}

impl Feature {
    /// Attribution candidates in tie-break order.
    pub const CANDIDATES: [Self; 6] = [
        Self::ProcessTemperature,
        Self::ToolWear,
        Self::Vibration,
        Self::Torque,
        Self::RotationalSpeed,
        Self::AirTemperature,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProcessTemperature => "Process Temperature",
            Self::ToolWear => "Tool Wear",
            Self::Vibration => "Vibration",
            Self::Torque => "Torque",
            Self::RotationalSpeed => "Rotational Speed",
            Self::AirTemperature => "Air Temperature",
        }
    }

    pub const fn value(self, v: &FeatureVector) -> f64 {
        match self {
            Self::ProcessTemperature => v.process_temperature,
            Self::ToolWear => v.tool_wear,
            Self::Vibration => v.vibration,
            Self::Torque => v.torque,
            Self::RotationalSpeed => v.rotational_speed,
            Self::AirTemperature => v.air_temperature,
        }
    }

    /// Impact reported when the feature carries no penalty.
    const fn healthy_impact(self) -> f64 {
        match self {
            Self::Torque => 8.0,
            Self::AirTemperature => -3.0,
            _ => 5.0,
        }
    }
}

/// Points subtracted from [`BASE_SCORE`] by each penalized channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Penalties {
    pub process_temperature: f64,
    pub tool_wear: f64,
    pub vibration: f64,
    pub torque: f64,
}

impl Penalties {
    pub fn assess(v: &FeatureVector) -> Self {
        Self {
            process_temperature: excess(v.process_temperature, PROCESS_TEMPERATURE_LIMIT)
                * PROCESS_TEMPERATURE_WEIGHT,
            tool_wear: v.tool_wear.max(0.0) * TOOL_WEAR_WEIGHT,
            vibration: excess(v.vibration, VIBRATION_LIMIT) * VIBRATION_WEIGHT,
            torque: excess(TORQUE_FLOOR, v.torque) * TORQUE_WEIGHT,
        }
    }

    pub fn total(&self) -> f64 {
        self.process_temperature + self.tool_wear + self.vibration + self.torque
    }

    /// Penalty term for a feature; `None` for features the model never penalizes.
    pub const fn for_feature(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::ProcessTemperature => Some(self.process_temperature),
            Feature::ToolWear => Some(self.tool_wear),
            Feature::Vibration => Some(self.vibration),
            Feature::Torque => Some(self.torque),
            Feature::RotationalSpeed | Feature::AirTemperature => None,
        }
    }
}

fn excess(value: f64, limit: f64) -> f64 {
    (value - limit).max(0.0)
}

/// Health score in `[0, 100]`, rounded to 0.1.
pub fn health_score(features: &FeatureVector) -> f64 {
    let penalties = Penalties::assess(features);
    round_to(clamp_score(BASE_SCORE - penalties.total()), 1)
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Signed contribution of one feature to the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribution {
    pub feature: Feature,
    pub value: f64,
    pub impact: f64,
}

/// Attribute every candidate feature, sorted by descending |impact|.
///
/// Penalized features report the negated penalty, capped at 100 points;
/// unpenalized ones report their fixed healthy impact. Ties keep candidate
/// order.
pub fn attribute(features: &FeatureVector, penalties: &Penalties) -> Vec<Attribution> {
    let mut attributions: Vec<Attribution> = Feature::CANDIDATES
        .iter()
        .map(|&feature| {
            let impact = match penalties.for_feature(feature) {
                Some(p) if p > 0.0 => -p.min(100.0),
                _ => feature.healthy_impact(),
            };
            Attribution { feature, value: feature.value(features), impact: round_to(impact, 1) }
        })
        .collect();
    attributions.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    attributions
}

/// Score telemetry into a dashboard prediction.
///
/// `failure_types` and `feature_responsibilities` are left unset; the
/// orchestrator fills them per scoring path.
pub fn score(machine_id: &str, telemetry: &TelemetryInput) -> PredictionResult {
    let features = FeatureVector::from(telemetry);
    let penalties = Penalties::assess(&features);
    let score = round_to(clamp_score(BASE_SCORE - penalties.total()), 1);
    let risk = RiskLevel::from_score(score);

    debug!(
        machine_id = %machine_id,
        process_temperature = penalties.process_temperature,
        tool_wear = penalties.tool_wear,
        vibration = penalties.vibration,
        torque = penalties.torque,
        score,
        risk = %risk,
        "Scored telemetry"
    );

    let top_features = attribute(&features, &penalties)
        .into_iter()
        .take(TOP_FEATURES)
        .map(|a| FeatureImpact {
            name: a.feature.label().to_string(),
            impact: a.impact,
            description: templates::feature_description(a.feature, risk).to_string(),
        })
        .collect();

    PredictionResult {
        score,
        risk,
        explanation: templates::assessment(risk, machine_id),
        top_features,
        failure_types: None,
        feature_responsibilities: None,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(process: f64, wear: f64, vibration: f64, torque: f64) -> TelemetryInput {
        TelemetryInput {
            process_temperature: Some(process),
            tool_wear: Some(wear),
            vibration: Some(vibration),
            torque: Some(torque),
            ..TelemetryInput::default()
        }
    }

    #[test]
    fn test_defaults_score_perfect() {
        let result = score("1", &TelemetryInput::default());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.risk, RiskLevel::Low);
        assert!(result.explanation.starts_with("Analysis of 1 "));
    }

    #[test]
    fn test_penalty_terms() {
        let p = Penalties::assess(&FeatureVector::from(&input(315.0, 20.0, 50.0, 25.0)));
        assert_eq!(p.process_temperature, 10.0);
        assert_eq!(p.tool_wear, 10.0);
        assert_eq!(p.vibration, 15.0);
        assert_eq!(p.torque, 5.0);
        assert_eq!(health_score(&FeatureVector::from(&input(315.0, 20.0, 50.0, 25.0))), 60.0);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let result = score("4", &input(325.0, 300.0, 90.0, 0.0));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.risk, RiskLevel::Critical);
    }

    #[test]
    fn test_top_features_sorted_by_magnitude() {
        let result = score("2", &input(312.0, 30.0, 40.0, 45.0));
        assert_eq!(result.top_features.len(), TOP_FEATURES);
        let magnitudes: Vec<f64> = result.top_features.iter().map(|f| f.impact.abs()).collect();
        assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]), "{magnitudes:?}");
        assert_eq!(result.top_features[0].name, "Tool Wear");
        assert_eq!(result.top_features[0].impact, -15.0);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        // No penalties: Torque (+8) leads, then the +5 group in candidate order.
        let attributions = attribute(&FeatureVector::DEFAULTS, &Penalties::default());
        let order: Vec<Feature> = attributions.iter().map(|a| a.feature).collect();
        assert_eq!(
            order,
            vec![
                Feature::Torque,
                Feature::ProcessTemperature,
                Feature::ToolWear,
                Feature::Vibration,
                Feature::RotationalSpeed,
                Feature::AirTemperature,
            ]
        );
    }

    #[test]
    fn test_explanation_depends_only_on_tier() {
        let a = score("7", &input(311.0, 60.0, 40.0, 40.0));
        let b = score("7", &input(310.0, 50.0, 42.0, 40.0));
        assert_eq!(a.risk, RiskLevel::Medium);
        assert_eq!(b.risk, RiskLevel::Medium);
        assert_eq!(a.explanation, b.explanation);
    }
}
