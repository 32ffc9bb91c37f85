//! Status Module - health tiers, classification and the published batch

pub mod types;
pub mod classifier;
pub mod store;

pub use types::{ClassificationResult, HealthTier, ResultBatch, TierCounts, round_probability};
pub use classifier::{StatusClassifier, StatusDecision, StatusOverride};
pub use store::ResultStore;
