//! Failure-mode probability estimates.
//!
//! Two estimates exist. [`physics_estimate`] reads the telemetry itself and
//! backs the scoring service. [`id_estimate`] is a coarse per-machine
//! approximation used when a prediction is scored locally.

use super::health::{round_to, Attribution, Feature, FeatureVector};
use crate::telemetry::machine_seed;
use crate::types::{FailureMode, FailureTypes, FeatureResponsibility, Responsibility};

/// Tool wear beyond which TWF probability climbs steeply (min).
const WEAR_ONSET: f64 = 200.0;
/// Process minus air temperature beyond which HDF climbs steeply (K).
const HEAT_DIFF_ONSET: f64 = 10.0;
/// Torque below which PWF is non-zero (Nm).
const TORQUE_FLOOR: f64 = 40.0;
/// Mechanical power below which PWF is raised (W).
const POWER_FLOOR_W: f64 = 5_000.0;
/// Rotational speed beyond which OSF climbs steeply (rpm).
const SPEED_ONSET: f64 = 1_800.0;
/// Air temperature above which it shares blame for heat dissipation (K).
const HOT_AIR_TEMPERATURE: f64 = 310.0;
/// Features considered when assigning responsibilities.
const RESPONSIBILITY_FEATURES: usize = 5;

/// Failure-mode probabilities from wear, heat, power and speed.
pub fn physics_estimate(v: &FeatureVector) -> FailureTypes {
    let twf = if v.tool_wear > WEAR_ONSET {
        (v.tool_wear - WEAR_ONSET) / 100.0
    } else {
        v.tool_wear / WEAR_ONSET * 0.5
    };

    let diff = v.process_temperature - v.air_temperature;
    let hdf = if diff > HEAT_DIFF_ONSET {
        (diff - HEAT_DIFF_ONSET) / 10.0
    } else {
        diff / HEAT_DIFF_ONSET * 0.3
    };

    let mut pwf = if v.torque < TORQUE_FLOOR { (TORQUE_FLOOR - v.torque) / 20.0 } else { 0.0 };
    let power_w = 2.0 * std::f64::consts::PI * v.rotational_speed / 60.0 * v.torque;
    if power_w < POWER_FLOOR_W {
        pwf = pwf.max(probability((POWER_FLOOR_W - power_w) / 3_000.0));
    }

    let osf = if v.rotational_speed > SPEED_ONSET {
        (v.rotational_speed - SPEED_ONSET) / 400.0
    } else {
        v.rotational_speed / SPEED_ONSET * 0.2
    };

    let (twf, hdf, pwf, osf) = (probability(twf), probability(hdf), probability(pwf), probability(osf));
    let rnf = probability(0.3 * twf + 0.3 * hdf + 0.2 * pwf + 0.2 * osf);

    FailureTypes::from([
        (FailureMode::ToolWear, round_to(twf, 3)),
        (FailureMode::HeatDissipation, round_to(hdf, 3)),
        (FailureMode::Power, round_to(pwf, 3)),
        (FailureMode::Overstrain, round_to(osf, 3)),
        (FailureMode::Random, round_to(rnf, 3)),
    ])
}

/// Per-machine approximation keyed on the numeric machine seed.
pub fn id_estimate(machine_id: &str) -> FailureTypes {
    let seed = machine_seed(machine_id);
    let step = |modulus: i64, per_step: f64, cap: f64| {
        round_to((seed.rem_euclid(modulus) as f64 * per_step).min(cap), 3)
    };
    FailureTypes::from([
        (FailureMode::ToolWear, step(3, 0.1, 0.3)),
        (FailureMode::HeatDissipation, step(2, 0.1, 0.2)),
        (FailureMode::Power, step(4, 0.05, 0.15)),
        (FailureMode::Overstrain, step(3, 0.1, 0.25)),
        (FailureMode::Random, step(5, 0.02, 0.1)),
    ])
}

/// Link the strongest attributed features to the failure modes they drive.
pub fn responsibilities(
    attributions: &[Attribution],
    estimate: &FailureTypes,
) -> Vec<FeatureResponsibility> {
    let p = |mode: FailureMode| estimate.get(&mode).copied().unwrap_or(0.0);

    attributions
        .iter()
        .take(RESPONSIBILITY_FEATURES)
        .map(|a| {
            let v = a.value;
            let blame = match a.feature {
                Feature::ToolWear => vec![Responsibility {
                    failure_type: FailureMode::ToolWear,
                    probability: p(FailureMode::ToolWear),
                    reason: format!("Tool wear value ({v:.1} min) indicates potential tool wear failure"),
                }],
                Feature::ProcessTemperature => vec![Responsibility {
                    failure_type: FailureMode::HeatDissipation,
                    probability: p(FailureMode::HeatDissipation),
                    reason: format!("Temperature value ({v:.1}K) suggests heat dissipation issues"),
                }],
                Feature::AirTemperature if v > HOT_AIR_TEMPERATURE => vec![Responsibility {
                    failure_type: FailureMode::HeatDissipation,
                    probability: round_to(p(FailureMode::HeatDissipation) * 0.5, 3),
                    reason: format!("High air temperature ({v:.1}K) may contribute to heat issues"),
                }],
                Feature::Torque => vec![Responsibility {
                    failure_type: FailureMode::Power,
                    probability: p(FailureMode::Power),
                    reason: format!("Power-related value ({v:.1}) indicates potential power failure"),
                }],
                Feature::RotationalSpeed => vec![Responsibility {
                    failure_type: FailureMode::Overstrain,
                    probability: p(FailureMode::Overstrain),
                    reason: format!("Rotational speed ({v:.1} rpm) may cause overstrain"),
                }],
                Feature::AirTemperature | Feature::Vibration => Vec::new(),
            };
            FeatureResponsibility {
                feature: a.feature.label().to_string(),
                value: v,
                responsible_for: blame,
            }
        })
        .collect()
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{attribute, Penalties};

    fn vector(air: f64, process: f64, speed: f64, torque: f64, wear: f64) -> FeatureVector {
        FeatureVector {
            air_temperature: air,
            process_temperature: process,
            rotational_speed: speed,
            torque,
            tool_wear: wear,
            ..FeatureVector::DEFAULTS
        }
    }

    #[test]
    fn test_id_estimate_for_machine_two() {
        let estimate = id_estimate("2");
        assert_eq!(estimate[&FailureMode::ToolWear], 0.2);
        assert_eq!(estimate[&FailureMode::HeatDissipation], 0.0);
        assert_eq!(estimate[&FailureMode::Power], 0.1);
        assert_eq!(estimate[&FailureMode::Overstrain], 0.2);
        assert_eq!(estimate[&FailureMode::Random], 0.04);
    }

    #[test]
    fn test_id_estimate_caps_and_non_numeric_ids() {
        let estimate = id_estimate("3");
        assert_eq!(estimate[&FailureMode::Power], 0.15);
        assert_eq!(estimate[&FailureMode::Random], 0.06);
        // Non-numeric ids seed as 1.
        assert_eq!(id_estimate("press"), id_estimate("1"));
        assert!(id_estimate("-7").values().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_physics_estimate_bounds() {
        let worn = physics_estimate(&vector(300.0, 325.0, 2200.0, 30.0, 300.0));
        assert_eq!(worn[&FailureMode::ToolWear], 1.0);
        assert_eq!(worn[&FailureMode::HeatDissipation], 1.0);
        assert_eq!(worn[&FailureMode::Overstrain], 1.0);
        assert_eq!(worn[&FailureMode::Power], 0.5);
        assert!(worn.values().all(|p| (0.0..=1.0).contains(p)));

        let healthy = physics_estimate(&vector(300.0, 310.0, 1500.0, 40.0, 0.0));
        assert_eq!(healthy[&FailureMode::ToolWear], 0.0);
        assert_eq!(healthy[&FailureMode::HeatDissipation], 0.3);
        assert_eq!(healthy[&FailureMode::Power], 0.0);
    }

    #[test]
    fn test_low_power_raises_pwf() {
        // 1200 rpm at 35 Nm is about 4.4 kW.
        let estimate = physics_estimate(&vector(300.0, 310.0, 1200.0, 35.0, 0.0));
        assert!(estimate[&FailureMode::Power] >= 0.25);
    }

    #[test]
    fn test_responsibilities_follow_attribution() {
        let v = vector(312.0, 325.0, 1500.0, 40.0, 150.0);
        let attributions = attribute(&v, &Penalties::assess(&v));
        let estimate = physics_estimate(&v);
        let blame = responsibilities(&attributions, &estimate);

        assert_eq!(blame.len(), 5);
        let wear = blame.iter().find(|b| b.feature == "Tool Wear").unwrap();
        assert_eq!(wear.responsible_for[0].failure_type, FailureMode::ToolWear);
        assert!(wear.responsible_for[0].reason.contains("150.0 min"));
        let vibration = blame.iter().find(|b| b.feature == "Vibration").unwrap();
        assert!(vibration.responsible_for.is_empty());
    }
}
