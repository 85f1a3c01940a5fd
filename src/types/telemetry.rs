use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::dates::parse_instant;
use crate::error::EngineError;

const MS_PER_DAY: i64 = 86_400_000;

/// Closed physical range for one telemetry channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One synthesized telemetry reading for a machine.
///
/// Keys stay snake_case on the wire; that is what telemetry services and
/// scorers exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Ambient air temperature (K)
    pub air_temperature: f64,
    /// Process temperature (K)
    pub process_temperature: f64,
    /// Spindle speed (rpm, integral)
    pub rotational_speed: f64,
    /// Torque (Nm)
    pub torque: f64,
    /// Accumulated tool wear (min)
    pub tool_wear: f64,
    /// Machine-type code (0, 1 or 2)
    #[serde(rename = "type")]
    pub machine_type: u8,
    pub timestamp: DateTime<Utc>,
}

impl TelemetrySnapshot {
    pub const AIR_TEMPERATURE: Bounds = Bounds::new(295.0, 315.0);
    pub const PROCESS_TEMPERATURE: Bounds = Bounds::new(305.0, 325.0);
    pub const ROTATIONAL_SPEED: Bounds = Bounds::new(1200.0, 2200.0);
    pub const TORQUE: Bounds = Bounds::new(30.0, 60.0);
    pub const TOOL_WEAR: Bounds = Bounds::new(0.0, 300.0);

    /// True when every channel sits inside its physical range.
    pub fn in_range(&self) -> bool {
        Self::AIR_TEMPERATURE.contains(self.air_temperature)
            && Self::PROCESS_TEMPERATURE.contains(self.process_temperature)
            && Self::ROTATIONAL_SPEED.contains(self.rotational_speed)
            && Self::TORQUE.contains(self.torque)
            && Self::TOOL_WEAR.contains(self.tool_wear)
    }
}

/// Telemetry as accepted by the health scorer. Every channel is optional;
/// the scorer substitutes its documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotational_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torque: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_wear: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<f64>,
}

impl From<&TelemetrySnapshot> for TelemetryInput {
    fn from(s: &TelemetrySnapshot) -> Self {
        Self {
            air_temperature: Some(s.air_temperature),
            process_temperature: Some(s.process_temperature),
            rotational_speed: Some(s.rotational_speed),
            torque: Some(s.torque),
            tool_wear: Some(s.tool_wear),
            vibration: None,
            pressure: None,
            humidity: None,
            machine_type: Some(f64::from(s.machine_type)),
        }
    }
}

impl From<TelemetrySnapshot> for TelemetryInput {
    fn from(s: TelemetrySnapshot) -> Self {
        Self::from(&s)
    }
}

/// Validated observation window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TelemetryWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::validation("endDate", "endDate must not precede startDate"));
        }
        Ok(Self { start, end })
    }

    /// Build a window from raw `startDate`/`endDate` query parameters.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, EngineError> {
        let start = Self::parse_bound("startDate", start)?;
        let end = Self::parse_bound("endDate", end)?;
        Self::new(start, end)
    }

    /// Window of `days` whole days ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        Self { start: end - Duration::days(i64::from(days)), end }
    }

    fn parse_bound(field: &'static str, raw: Option<&str>) -> Result<DateTime<Utc>, EngineError> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::validation(field, format!("{field} is required")))?;
        parse_instant(raw).ok_or_else(|| {
            EngineError::validation(field, format!("{field} '{raw}' is not a valid date"))
        })
    }

    /// Whole days covered by the window, never less than one.
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_milliseconds() / MS_PER_DAY).max(1)
    }

    /// Midpoint of the window in epoch milliseconds.
    pub fn midpoint_millis(&self) -> f64 {
        let start = self.start.timestamp_millis() as f64;
        let end = self.end.timestamp_millis() as f64;
        (start + end) / 2.0
    }
}
