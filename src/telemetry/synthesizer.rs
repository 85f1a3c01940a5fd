//! Deterministic-shape telemetry synthesis with injected randomness.
//!
//! A reading is the profile baseline plus a slow daily phase, uniform jitter,
//! an hourly load cycle, wear accrued over the window and a status offset.
//! Results are clamped to the physical ranges on [`TelemetrySnapshot`].

use chrono::{DateTime, Utc};
use rand::Rng;

use super::profiles::{machine_seed, profile, MachineStatus};
use crate::types::{TelemetrySnapshot, TelemetryWindow};

const MS_PER_DAY: f64 = 86_400_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Frequency of the slow daily phase (radians per day).
const DAILY_PHASE_FREQUENCY: f64 = 0.1;
/// Amplitude of the daily phase (K).
const DAILY_PHASE_AMPLITUDE: f64 = 5.0;
/// Full width of the shared temperature jitter (K).
const TEMPERATURE_JITTER: f64 = 10.0;
/// Full width of the speed jitter (rpm).
const SPEED_JITTER: f64 = 200.0;
/// Full width of the torque jitter (Nm).
const TORQUE_JITTER: f64 = 10.0;
/// Full width of the wear jitter (min).
const WEAR_JITTER: f64 = 20.0;
/// Wear-rate growth per day elapsed since the window start.
const DEGRADATION_PER_DAY: f64 = 0.001;
/// Frequency of the hourly load cycle (radians per hour).
const HOURLY_CYCLE_FREQUENCY: f64 = 0.1;
const HOURLY_SPEED_SWING: f64 = 50.0;
const HOURLY_TORQUE_SWING: f64 = 2.0;
/// Process temperature runs this far above ambient (K).
const PROCESS_TEMPERATURE_OFFSET: f64 = 10.0;

/// Additive shifts applied for a machine's operating status.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StatusOffset {
    process_temperature: f64,
    tool_wear: f64,
    rotational_speed: f64,
    torque: f64,
}

impl StatusOffset {
    const fn for_status(status: MachineStatus) -> Self {
        match status {
            MachineStatus::Operational => Self {
                process_temperature: 0.0,
                tool_wear: 0.0,
                rotational_speed: 0.0,
                torque: 0.0,
            },
            MachineStatus::Warning => Self {
                process_temperature: 5.0,
                tool_wear: 10.0,
                rotational_speed: 0.0,
                torque: -2.0,
            },
            MachineStatus::Maintenance => Self {
                process_temperature: 8.0,
                tool_wear: 25.0,
                rotational_speed: -50.0,
                torque: -5.0,
            },
        }
    }
}

/// Synthesize a reading using the thread RNG and the current instant.
pub fn synthesize(machine_id: &str, window: &TelemetryWindow) -> TelemetrySnapshot {
    synthesize_with(machine_id, window, Utc::now(), &mut rand::thread_rng())
}

/// Synthesize a reading with an explicit clock and randomness source.
pub fn synthesize_with<R: Rng + ?Sized>(
    machine_id: &str,
    window: &TelemetryWindow,
    now: DateTime<Utc>,
    rng: &mut R,
) -> TelemetrySnapshot {
    let profile = profile(machine_id);
    let days = window.days() as f64;
    let midpoint_ms = window.midpoint_millis();

    let phase = (midpoint_ms / MS_PER_DAY * DAILY_PHASE_FREQUENCY).sin() * DAILY_PHASE_AMPLITUDE;
    let jitter = centered(rng) * TEMPERATURE_JITTER;

    let elapsed_days = (now - window.start).num_milliseconds().div_euclid(86_400_000);
    let degradation = 1.0 + elapsed_days as f64 * DEGRADATION_PER_DAY;

    let mut air_temperature = profile.base_temp + phase + jitter;
    let mut process_temperature =
        profile.base_temp + PROCESS_TEMPERATURE_OFFSET + phase * 1.2 + jitter * 1.5;
    let mut rotational_speed = profile.base_speed + centered(rng) * SPEED_JITTER;
    let mut torque = profile.base_torque + centered(rng) * TORQUE_JITTER;
    let mut tool_wear =
        (days * profile.wear_rate * degradation + centered(rng) * WEAR_JITTER).max(0.0);

    let cycle = (midpoint_ms / MS_PER_HOUR * HOURLY_CYCLE_FREQUENCY).sin();
    rotational_speed += cycle * HOURLY_SPEED_SWING;
    torque += cycle * HOURLY_TORQUE_SWING;

    let offset = StatusOffset::for_status(profile.status);
    process_temperature += offset.process_temperature;
    tool_wear += offset.tool_wear;
    rotational_speed += offset.rotational_speed;
    torque += offset.torque;

    air_temperature = round_tenth(TelemetrySnapshot::AIR_TEMPERATURE.clamp(air_temperature));
    process_temperature =
        round_tenth(TelemetrySnapshot::PROCESS_TEMPERATURE.clamp(process_temperature));
    rotational_speed = TelemetrySnapshot::ROTATIONAL_SPEED.clamp(rotational_speed).round();
    torque = round_tenth(TelemetrySnapshot::TORQUE.clamp(torque));
    tool_wear = round_tenth(TelemetrySnapshot::TOOL_WEAR.clamp(tool_wear));

    tracing::debug!(
        machine_id = %machine_id,
        seed = machine_seed(machine_id),
        days,
        degradation,
        status = %profile.status,
        "Synthesized telemetry"
    );

    TelemetrySnapshot {
        air_temperature,
        process_temperature,
        rotational_speed,
        torque,
        tool_wear,
        machine_type: profile.machine_type,
        timestamp: now,
    }
}

/// Uniform sample in `[-0.5, 0.5)`.
fn centered<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() - 0.5
}

/// Round to one decimal place. Clamped bounds are whole numbers, so the
/// result stays in range.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
