//! ATM Health core library
//!
//! Feature synthesis, failure-probability scoring, status classification and
//! the publish/poll loops shared by the standalone binary, the simulator,
//! the dashboard and the status service.

pub mod constants;
pub mod logic;

pub use logic::config::{ConfigError, FleetConfig};
pub use logic::features::{FeatureRecord, FeatureSynthesizer, SynthesisMode, TaggedFeatures};
pub use logic::model::{InferenceEngine, ModelError, StatusThresholds};
pub use logic::pipeline::{log_operational_status, ScoringPipeline};
pub use logic::status::{ClassificationResult, HealthTier, ResultBatch, ResultStore, StatusClassifier};
