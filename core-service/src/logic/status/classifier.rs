//! Status Classifier
//!
//! Maps `(atm_id, probability)` to a health tier and recommended action.
//! An entry in the override table wins over the probability bands
//! unconditionally.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::logic::model::StatusThresholds;
use super::types::HealthTier;

/// Fixed status for one ATM, ignoring its score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOverride {
    pub tier: HealthTier,
    /// Defaults to the tier's standard action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl StatusOverride {
    pub fn new(tier: HealthTier) -> Self {
        Self { tier, action: None }
    }

    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_else(|| self.tier.default_action())
    }
}

/// Tier + action decided for one ATM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDecision {
    pub tier: HealthTier,
    pub action: String,
    pub overridden: bool,
}

#[derive(Debug, Clone)]
pub struct StatusClassifier {
    thresholds: StatusThresholds,
    overrides: HashMap<String, StatusOverride>,
}

impl StatusClassifier {
    pub fn new(thresholds: StatusThresholds) -> Self {
        Self { thresholds, overrides: HashMap::new() }
    }

    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, StatusOverride)>,
    {
        self.overrides.extend(overrides);
        self
    }

    pub fn thresholds(&self) -> &StatusThresholds {
        &self.thresholds
    }

    pub fn override_for(&self, atm_id: &str) -> Option<&StatusOverride> {
        self.overrides.get(atm_id)
    }

    pub fn classify(&self, atm_id: &str, probability: f64) -> StatusDecision {
        if let Some(fixed) = self.overrides.get(atm_id) {
            return StatusDecision {
                tier: fixed.tier,
                action: fixed.action().to_string(),
                overridden: true,
            };
        }

        let tier = self.thresholds.tier_for(probability);
        StatusDecision {
            tier,
            action: tier.default_action().to_string(),
            overridden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_classifier() -> StatusClassifier {
        StatusClassifier::new(StatusThresholds::new(0.2, 0.8).unwrap()).with_overrides([
            ("ATM-001".to_string(), StatusOverride::new(HealthTier::Healthy)),
            ("ATM-002".to_string(), StatusOverride::new(HealthTier::Warning)),
            ("ATM-003".to_string(), StatusOverride::new(HealthTier::Critical)),
        ])
    }

    #[test]
    fn test_override_ignores_probability() {
        let classifier = reference_classifier();
        for p in [0.0, 0.5, 0.8, 1.0] {
            assert_eq!(classifier.classify("ATM-001", p).tier, HealthTier::Healthy);
            assert_eq!(classifier.classify("ATM-002", p).tier, HealthTier::Warning);
            let critical = classifier.classify("ATM-003", p);
            assert_eq!(critical.tier, HealthTier::Critical);
            assert_eq!(critical.action, "Immediate technician dispatch");
            assert!(critical.overridden);
        }
    }

    #[test]
    fn test_custom_override_action() {
        let classifier = reference_classifier().with_overrides([(
            "ATM-009".to_string(),
            StatusOverride { tier: HealthTier::Warning, action: Some("Refill cash".to_string()) },
        )]);
        let decision = classifier.classify("ATM-009", 0.99);
        assert_eq!(decision.tier, HealthTier::Warning);
        assert_eq!(decision.action, "Refill cash");
    }

    #[test]
    fn test_threshold_path() {
        let classifier = reference_classifier();
        let cases = [
            (0.0, HealthTier::Healthy, "No action required"),
            (0.2, HealthTier::Healthy, "No action required"),
            (0.21, HealthTier::Warning, "Schedule maintenance"),
            (0.8, HealthTier::Warning, "Schedule maintenance"),
            (0.81, HealthTier::Critical, "Immediate technician dispatch"),
            (1.0, HealthTier::Critical, "Immediate technician dispatch"),
        ];
        for (p, tier, action) in cases {
            let decision = classifier.classify("ATM-004", p);
            assert_eq!(decision.tier, tier, "p = {p}");
            assert_eq!(decision.action, action);
            assert!(!decision.overridden);
        }
    }

    #[test]
    fn test_total_over_unit_interval() {
        let classifier = reference_classifier();
        for step in 0..=1000 {
            let p = step as f64 / 1000.0;
            let decision = classifier.classify("ATM-004", p);
            assert_eq!(decision.action, decision.tier.default_action());
        }
    }
}
