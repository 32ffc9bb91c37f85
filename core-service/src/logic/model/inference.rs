//! Inference Engine - Classifier Adapter
//!
//! Loads a pre-trained binary classifier once and scores batches of
//! [`FeatureRecord`]s. Loaded classifiers are immutable; scoring the same
//! input twice gives the same probabilities.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::{layout_hash, FeatureRecord, LayoutMismatchError, FEATURE_COUNT};
use super::forest::ForestClassifier;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] LayoutMismatchError),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("classifier returned {actual} probabilities for {expected} records")]
    OutputShape { expected: usize, actual: usize },

    #[error("classifier returned {value} for record {index}, expected a probability in [0, 1]")]
    ProbabilityRange { index: usize, value: f64 },
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub format: String,
    pub feature_count: usize,
    pub layout_hash: u32,
    /// SHA-256 of the artifact bytes
    pub checksum: String,
    pub estimators: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl ModelMetadata {
    pub(crate) fn for_artifact(path: &Path, format: &str, bytes: &[u8], estimators: usize) -> Self {
        Self {
            model_path: path.display().to_string(),
            format: format.to_string(),
            feature_count: FEATURE_COUNT,
            layout_hash: layout_hash(),
            checksum: checksum(bytes),
            estimators,
            loaded_at: chrono::Utc::now(),
        }
    }
}

/// Engine status for the model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model: ModelMetadata,
    pub avg_latency_ms: f64,
    pub inference_count: u64,
    pub records_scored: u64,
}

/// Hex-encoded SHA-256 of the given bytes
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Binary probability model
pub trait Classifier: Send + Sync {
    /// Positive-class probability per record, in input order
    fn predict_proba(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, ModelError>;

    fn metadata(&self) -> &ModelMetadata;
}

/// Load a classifier artifact, picking the backend from the file extension
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<dyn Classifier>, ModelError> {
    let path = path.as_ref();
    log::info!("Loading classifier from: {}", path.display());

    if !path.exists() {
        return Err(ModelError::NotFound(path.to_path_buf()));
    }

    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let classifier: Arc<dyn Classifier> = match extension.as_str() {
        "json" => Arc::new(ForestClassifier::load(path)?),
        #[cfg(feature = "onnx")]
        "onnx" => Arc::new(super::onnx::OnnxClassifier::load(path)?),
        other => return Err(ModelError::UnsupportedFormat(format!(
            "'.{}' (expected .json{})",
            other,
            if cfg!(feature = "onnx") { " or .onnx" } else { "; build with --features onnx for .onnx" }
        ))),
    };

    let meta = classifier.metadata();
    log::info!(
        "Classifier loaded: format={} estimators={} sha256={}",
        meta.format, meta.estimators, &meta.checksum[..12.min(meta.checksum.len())]
    );

    Ok(classifier)
}

// ============================================================================
// SCORING ENGINE
// ============================================================================

/// Shared handle around a loaded classifier that tracks latency stats
#[derive(Clone)]
pub struct InferenceEngine {
    classifier: Arc<dyn Classifier>,
    stats: Arc<EngineStats>,
}

#[derive(Default)]
struct EngineStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    records_scored: AtomicU64,
}

impl InferenceEngine {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier, stats: Arc::default() }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        load_classifier(path).map(Self::new)
    }

    /// Score a batch; output has the same length and order as the input
    pub fn score(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, ModelError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let probabilities = self.classifier.predict_proba(batch)?;
        if probabilities.len() != batch.len() {
            return Err(ModelError::OutputShape {
                expected: batch.len(),
                actual: probabilities.len(),
            });
        }
        if let Some((index, value)) = probabilities.iter()
            .copied()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(p))
        {
            return Err(ModelError::ProbabilityRange { index, value });
        }

        self.stats.latency_sum_us.fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.stats.inference_count.fetch_add(1, Ordering::Relaxed);
        self.stats.records_scored.fetch_add(batch.len() as u64, Ordering::Relaxed);

        Ok(probabilities)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.classifier.metadata()
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.stats.latency_sum_us.load(Ordering::Relaxed);
        let count = self.stats.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            model: self.metadata().clone(),
            avg_latency_ms: avg,
            inference_count: count,
            records_scored: self.stats.records_scored.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("model", self.metadata())
            .finish()
    }
}
