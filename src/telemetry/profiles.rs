//! Static machine reference data: synthesis profiles and the display catalog.

use serde::Serialize;
use std::fmt;

/// Operating status that shifts synthesized readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Operational,
    Warning,
    Maintenance,
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Operational => "operational",
            Self::Warning => "warning",
            Self::Maintenance => "maintenance",
        })
    }
}

/// Baselines the synthesizer perturbs for one machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineProfile {
    pub id: &'static str,
    /// Base air temperature (K)
    pub base_temp: f64,
    /// Base rotational speed (rpm)
    pub base_speed: f64,
    /// Base torque (Nm)
    pub base_torque: f64,
    /// Tool wear accrued per day (min)
    pub wear_rate: f64,
    pub machine_type: u8,
    pub status: MachineStatus,
}

const PROFILES: [MachineProfile; 6] = [
    MachineProfile { id: "1", base_temp: 300.0, base_speed: 1500.0, base_torque: 40.0, wear_rate: 0.1, machine_type: 0, status: MachineStatus::Operational },
    MachineProfile { id: "2", base_temp: 305.0, base_speed: 1800.0, base_torque: 45.0, wear_rate: 0.3, machine_type: 1, status: MachineStatus::Warning },
    MachineProfile { id: "3", base_temp: 298.0, base_speed: 1400.0, base_torque: 38.0, wear_rate: 0.05, machine_type: 2, status: MachineStatus::Operational },
    MachineProfile { id: "4", base_temp: 310.0, base_speed: 1600.0, base_torque: 42.0, wear_rate: 0.5, machine_type: 0, status: MachineStatus::Maintenance },
    MachineProfile { id: "5", base_temp: 302.0, base_speed: 1700.0, base_torque: 43.0, wear_rate: 0.15, machine_type: 1, status: MachineStatus::Operational },
    MachineProfile { id: "6", base_temp: 308.0, base_speed: 1900.0, base_torque: 48.0, wear_rate: 0.4, machine_type: 2, status: MachineStatus::Warning },
];

/// Profile for `machine_id`, or machine 1's profile for unknown ids.
pub fn profile(machine_id: &str) -> &'static MachineProfile {
    PROFILES
        .iter()
        .find(|p| p.id == machine_id.trim())
        .unwrap_or(&PROFILES[0])
}

pub fn profiles() -> &'static [MachineProfile] {
    &PROFILES
}

/// Numeric seed derived from a machine id.
///
/// Reads the leading (optionally signed) integer of the id; ids with no
/// leading digits, or whose leading integer is zero, seed as 1.
pub fn machine_seed(machine_id: &str) -> i64 {
    let trimmed = machine_id.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => sign * n,
    }
}

/// Catalog entry shown on the dashboard's machine list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineInfo {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: MachineStatus,
    pub location: &'static str,
    pub last_maintenance: &'static str,
    /// Overall equipment efficiency (%)
    pub efficiency: u8,
}

const CATALOG: [MachineInfo; 6] = [
    MachineInfo { id: "1", name: "Machine A - Production Line 1", kind: "CNC Lathe", status: MachineStatus::Operational, location: "Factory Floor A", last_maintenance: "2024-01-15", efficiency: 94 },
    MachineInfo { id: "2", name: "Machine B - Production Line 2", kind: "Milling Machine", status: MachineStatus::Warning, location: "Factory Floor A", last_maintenance: "2024-01-10", efficiency: 87 },
    MachineInfo { id: "3", name: "Machine C - Production Line 1", kind: "Assembly Robot", status: MachineStatus::Operational, location: "Factory Floor B", last_maintenance: "2024-01-12", efficiency: 96 },
    MachineInfo { id: "4", name: "Machine D - Quality Control", kind: "Inspection Station", status: MachineStatus::Maintenance, location: "Factory Floor B", last_maintenance: "2024-01-08", efficiency: 78 },
    MachineInfo { id: "5", name: "Machine E - Production Line 3", kind: "Packaging System", status: MachineStatus::Operational, location: "Factory Floor C", last_maintenance: "2024-01-14", efficiency: 92 },
    MachineInfo { id: "6", name: "Machine F - Material Handling", kind: "Conveyor System", status: MachineStatus::Warning, location: "Factory Floor C", last_maintenance: "2024-01-09", efficiency: 85 },
];

pub fn catalog() -> &'static [MachineInfo] {
    &CATALOG
}

pub fn machine_info(machine_id: &str) -> Option<&'static MachineInfo> {
    CATALOG.iter().find(|m| m.id == machine_id.trim())
}

/// Display name for a machine, `"Machine {id}"` when not in the catalog.
pub fn machine_name(machine_id: &str) -> String {
    machine_info(machine_id).map_or_else(|| format!("Machine {machine_id}"), |m| m.name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_uses_default_profile() {
        assert_eq!(profile("4").status, MachineStatus::Maintenance);
        assert_eq!(profile("99").id, "1");
        assert_eq!(profile("press-7").id, "1");
    }

    #[test]
    fn test_machine_seed_leading_integer() {
        assert_eq!(machine_seed("2"), 2);
        assert_eq!(machine_seed("12abc"), 12);
        assert_eq!(machine_seed("abc"), 1);
        assert_eq!(machine_seed("0"), 1);
        assert_eq!(machine_seed("-5"), -5);
        assert_eq!(machine_seed(""), 1);
    }

    #[test]
    fn test_catalog_matches_profiles() {
        for info in catalog() {
            assert_eq!(profile(info.id).id, info.id);
            assert_eq!(profile(info.id).status, info.status);
        }
        assert_eq!(machine_name("3"), "Machine C - Production Line 1");
        assert_eq!(machine_name("42"), "Machine 42");
    }
}
