//! Fixed per-tier wording for explanations and feature descriptions.

use super::Feature;
use crate::types::RiskLevel;

/// Dashboard explanation for a prediction.
pub fn assessment(risk: RiskLevel, machine_id: &str) -> String {
    let body = match risk {
        RiskLevel::Low => {
            "indicates excellent operational health during the selected period. All key metrics are within normal ranges with minimal variance. Recommended actions: Continue current maintenance schedule."
        }
        RiskLevel::Medium => {
            "shows moderate performance with some areas requiring attention. While the equipment is operational, several factors suggest upcoming maintenance needs. Recommended actions: Schedule preventive maintenance within the next 2-4 weeks."
        }
        RiskLevel::High => {
            "reveals significant deterioration trends. Multiple indicators suggest increased failure risk. Immediate attention recommended. Recommended actions: Schedule maintenance within 1-2 weeks and increase monitoring frequency."
        }
        RiskLevel::Critical => {
            "indicates critical condition with high failure probability. Multiple failure modes detected. Urgent intervention required. Recommended actions: Schedule immediate inspection and prepare for emergency maintenance."
        }
    };
    format!("Analysis of {machine_id} {body}")
}

/// Short condition summary returned by the scoring service.
pub fn condition_summary(risk: RiskLevel, machine_id: &str) -> String {
    let body = match risk {
        RiskLevel::Low => {
            "shows excellent health indicators. All telemetry parameters are within normal operating ranges."
        }
        RiskLevel::Medium => {
            "shows moderate performance. Some telemetry parameters indicate potential maintenance needs in the near future."
        }
        RiskLevel::High => {
            "shows concerning trends. Multiple telemetry parameters suggest increased failure risk. Immediate attention recommended."
        }
        RiskLevel::Critical => {
            "is in critical condition. Multiple telemetry parameters indicate high failure probability. Urgent maintenance required."
        }
    };
    format!("Machine {machine_id} {body}")
}

pub const fn feature_description(feature: Feature, risk: RiskLevel) -> &'static str {
    use Feature::*;
    use RiskLevel::*;
    match (feature, risk) {
        (ProcessTemperature, Low) => "Optimal temperature range",
        (ProcessTemperature, Medium) => "Slight process temperature elevation",
        (ProcessTemperature, High) => "Gradual temperature increase",
        (ProcessTemperature, Critical) => "Severe process overheating",

        (ToolWear, Low) => "Tool wear within limits",
        (ToolWear, Medium) => "Moderate tool wear accumulation",
        (ToolWear, High) => "Advanced tool wear",
        (ToolWear, Critical) => "Tool at end of service life",

        (Vibration, Low) => "Normal vibration levels",
        (Vibration, Medium) => "Minor vibration irregularities",
        (Vibration, High) => "Elevated vibration patterns",
        (Vibration, Critical) => "Critical vibration levels",

        (Torque, Low) => "Operating within specifications",
        (Torque, Medium) => "Torque fluctuations observed",
        (Torque, High) => "Irregular torque load",
        (Torque, Critical) => "Torque outside safe limits",

        (RotationalSpeed, Low) => "Stable rotational speed",
        (RotationalSpeed, Medium) => "Minor speed variation",
        (RotationalSpeed, High) => "Speed instability detected",
        (RotationalSpeed, Critical) => "Severe speed instability",

        (AirTemperature, Low) => "Ambient conditions nominal",
        (AirTemperature, Medium) => "Ambient temperature slightly elevated",
        (AirTemperature, High) => "Ambient temperature limiting cooling",
        (AirTemperature, Critical) => "Ambient temperature impairing heat dissipation",
    }
}
