//! Status Types
//!
//! Health tiers and the batch published on every producer cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::features::EntityId;

// ============================================================================
// HEALTH TIER
// ============================================================================

/// Discrete health tier of one ATM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthTier {
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    /// Recommended action when nothing more specific is configured
    pub fn default_action(&self) -> &'static str {
        match self {
            HealthTier::Healthy => "No action required",
            HealthTier::Warning => "Schedule maintenance",
            HealthTier::Critical => "Immediate technician dispatch",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthTier::Healthy => "HEALTHY",
            HealthTier::Warning => "WARNING",
            HealthTier::Critical => "CRITICAL",
        }
    }

    /// Status light used by console and dashboard output
    pub fn marker(&self) -> &'static str {
        match self {
            HealthTier::Healthy => "🟢",
            HealthTier::Warning => "🟡",
            HealthTier::Critical => "🔴",
        }
    }
}

impl std::fmt::Display for HealthTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Scored status of one ATM for one publish cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub atm_id: EntityId,
    /// Positive-class probability rounded to 4 decimals
    pub failure_probability: f64,
    #[serde(rename = "health_status")]
    pub health_tier: HealthTier,
    pub recommended_action: String,
}

/// Round a probability to 4 decimal places
pub fn round_probability(p: f64) -> f64 {
    (p * 10_000.0).round() / 10_000.0
}

// ============================================================================
// RESULT BATCH
// ============================================================================

/// Most recent published set of results, one per tracked ATM.
///
/// Batches are built whole and never appended to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBatch {
    /// `None` until the first publish
    pub batch_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
    pub results: Vec<ClassificationResult>,
}

impl ResultBatch {
    /// Stamp a fresh batch
    pub fn new(results: Vec<ClassificationResult>) -> Self {
        Self {
            batch_id: Some(Uuid::new_v4()),
            published_at: Some(Utc::now()),
            results,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn get(&self, atm_id: &str) -> Option<&ClassificationResult> {
        self.results.iter().find(|r| r.atm_id == atm_id)
    }

    pub fn summary(&self) -> TierCounts {
        let mut counts = TierCounts::default();
        for result in &self.results {
            match result.health_tier {
                HealthTier::Healthy => counts.healthy += 1,
                HealthTier::Warning => counts.warning += 1,
                HealthTier::Critical => counts.critical += 1,
            }
        }
        counts
    }
}

/// GOOD / WARNING / CRITICAL counts of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, tier: HealthTier) -> ClassificationResult {
        ClassificationResult {
            atm_id: id.to_string(),
            failure_probability: 0.5,
            health_tier: tier,
            recommended_action: tier.default_action().to_string(),
        }
    }

    #[test]
    fn test_round_probability() {
        assert_eq!(round_probability(0.123456), 0.1235);
        assert_eq!(round_probability(0.0), 0.0);
        assert_eq!(round_probability(1.0), 1.0);
    }

    #[test]
    fn test_tier_wire_format() {
        let json = serde_json::to_value(result("ATM-001", HealthTier::Critical)).unwrap();
        assert_eq!(json["health_status"], "CRITICAL");
        assert_eq!(json["recommended_action"], "Immediate technician dispatch");
    }

    #[test]
    fn test_default_batch_is_empty() {
        let batch = ResultBatch::default();
        assert!(batch.is_empty());
        assert!(batch.batch_id.is_none());
        assert!(batch.published_at.is_none());
    }

    #[test]
    fn test_summary_counts() {
        let batch = ResultBatch::new(vec![
            result("ATM-001", HealthTier::Healthy),
            result("ATM-002", HealthTier::Warning),
            result("ATM-003", HealthTier::Critical),
            result("ATM-004", HealthTier::Warning),
        ]);
        assert_eq!(batch.summary(), TierCounts { healthy: 1, warning: 2, critical: 1 });
        assert_eq!(batch.get("ATM-004").map(|r| r.health_tier), Some(HealthTier::Warning));
        assert!(batch.batch_id.is_some());
    }
}
