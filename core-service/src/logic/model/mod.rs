//! Model Module - Classifier Adapter
//!
//! Keeps inference separate from feature synthesis and status logic, so the
//! artifact backend can be swapped without touching the pipeline.

pub mod inference;
pub mod forest;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod threshold;

// Re-export common types
pub use inference::{
    load_classifier, Classifier, EngineStatus, InferenceEngine, ModelError, ModelMetadata,
};
pub use forest::ForestClassifier;
pub use threshold::{StatusThresholds, ThresholdError, DEFAULT_CRITICAL_ABOVE};
