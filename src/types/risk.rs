use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse risk classification derived from a health score.
///
/// Variants are ordered by severity, so `Low < Critical`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Minimum score (inclusive) classified as `Low`.
    pub const LOW_MIN_SCORE: f64 = 75.0;
    /// Minimum score (inclusive) classified as `Medium`.
    pub const MEDIUM_MIN_SCORE: f64 = 50.0;
    /// Minimum score (inclusive) classified as `High`.
    pub const HIGH_MIN_SCORE: f64 = 25.0;

    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Classify a health score. This is the only place tier boundaries live.
    ///
    /// Non-finite scores classify as `Critical`.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::LOW_MIN_SCORE {
            Self::Low
        } else if score >= Self::MEDIUM_MIN_SCORE {
            Self::Medium
        } else if score >= Self::HIGH_MIN_SCORE {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Capitalized label used in alert titles ("High", "Critical").
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid risk level '{0}' (expected low, medium, high or critical)")]
pub struct ParseRiskLevelError(pub String);

impl FromStr for RiskLevel {
    type Err = ParseRiskLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseRiskLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(74.999), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49.999), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(25.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(24.999), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Critical);
    }

    #[test]
    fn test_severity_monotonic_in_score() {
        let mut previous = RiskLevel::from_score(0.0);
        for step in 1..=1000 {
            let tier = RiskLevel::from_score(f64::from(step) * 0.1);
            assert!(tier <= previous, "severity rose at score {}", f64::from(step) * 0.1);
            previous = tier;
        }
    }

    #[test]
    fn test_nan_is_critical() {
        assert_eq!(RiskLevel::from_score(f64::NAN), RiskLevel::Critical);
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("severe".parse::<RiskLevel>().is_err());
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
    }
}
