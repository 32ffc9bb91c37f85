//! Status Threshold Configuration
//!
//! Probability bands that map a failure probability to a health tier.
//! Both bounds are strict: a probability must be *above* a bound to enter
//! the band. There is no built-in WARNING lower bound; it always comes from
//! the fleet configuration.

use serde::{Deserialize, Serialize};

use crate::logic::status::HealthTier;

/// Threshold bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusThresholds {
    /// WARNING when probability > warning_above
    pub warning_above: f64,

    /// CRITICAL when probability > critical_above
    #[serde(default = "default_critical_above")]
    pub critical_above: f64,
}

/// CRITICAL band lower bound (strict `>`)
pub const DEFAULT_CRITICAL_ABOVE: f64 = 0.8;

fn default_critical_above() -> f64 {
    DEFAULT_CRITICAL_ABOVE
}

/// Threshold configuration error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdError {
    #[error("threshold {name} = {value} is outside [0, 1]")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("warning_above ({warning}) must be below critical_above ({critical})")]
    Inverted { warning: f64, critical: f64 },
}

impl StatusThresholds {
    pub fn new(warning_above: f64, critical_above: f64) -> Result<Self, ThresholdError> {
        let thresholds = Self { warning_above, critical_above };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        for (name, value) in [("warning_above", self.warning_above), ("critical_above", self.critical_above)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ThresholdError::OutOfRange { name, value });
            }
        }
        if self.warning_above >= self.critical_above {
            return Err(ThresholdError::Inverted {
                warning: self.warning_above,
                critical: self.critical_above,
            });
        }
        Ok(())
    }

    /// Band a probability falls into
    pub fn tier_for(&self, probability: f64) -> HealthTier {
        if probability > self.critical_above {
            HealthTier::Critical
        } else if probability > self.warning_above {
            HealthTier::Warning
        } else {
            HealthTier::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        let t = StatusThresholds::new(0.2, 0.8).unwrap();
        assert_eq!(t.tier_for(0.0), HealthTier::Healthy);
        assert_eq!(t.tier_for(0.5), HealthTier::Warning);
        assert_eq!(t.tier_for(0.95), HealthTier::Critical);
    }

    #[test]
    fn test_upper_bound_is_strict() {
        let t = StatusThresholds::new(0.2, 0.8).unwrap();
        assert_eq!(t.tier_for(0.8), HealthTier::Warning);
        assert_eq!(t.tier_for(0.800_001), HealthTier::Critical);
    }

    #[test]
    fn test_warning_lower_bound_is_strict() {
        let low = StatusThresholds::new(0.01, 0.8).unwrap();
        assert_eq!(low.tier_for(0.01), HealthTier::Healthy);
        assert_eq!(low.tier_for(0.0101), HealthTier::Warning);

        let high = StatusThresholds::new(0.2, 0.8).unwrap();
        assert_eq!(high.tier_for(0.2), HealthTier::Healthy);
        assert_eq!(high.tier_for(0.05), HealthTier::Healthy);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            StatusThresholds::new(0.9, 0.8),
            Err(ThresholdError::Inverted { .. })
        ));
        assert!(matches!(
            StatusThresholds::new(-0.1, 0.8),
            Err(ThresholdError::OutOfRange { name: "warning_above", .. })
        ));
        assert!(StatusThresholds::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn test_deserialize_requires_warning_bound() {
        let parsed: StatusThresholds = serde_json::from_str(r#"{"warning_above": 0.01}"#).unwrap();
        assert_eq!(parsed.critical_above, DEFAULT_CRITICAL_ABOVE);

        assert!(serde_json::from_str::<StatusThresholds>(r#"{"critical_above": 0.8}"#).is_err());
    }
}
