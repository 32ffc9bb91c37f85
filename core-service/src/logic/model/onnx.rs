//! ONNX Runtime backend
//!
//! For classifiers exported to ONNX (e.g. a scikit-learn forest converted with
//! `zipmap=False`). ONNX graphs carry no column names, so a sidecar
//! `<model>.features.json` (a JSON array of names) declares the layout.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::features::{validate_feature_names, FeatureRecord, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT};
use super::inference::{Classifier, ModelError, ModelMetadata};

/// Output holding `[batch, 2]` class probabilities
const PROBABILITY_OUTPUT: &str = "probabilities";

pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

fn sidecar_path(model_path: &Path) -> PathBuf {
    model_path.with_extension("features.json")
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let sidecar = sidecar_path(path);
        let names: Vec<String> = match std::fs::read(&sidecar) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ModelError::Parse(format!("{}: {}", sidecar.display(), e)))?,
            Err(_) => {
                log::error!("Feature sidecar missing: {}", sidecar.display());
                return Err(ModelError::SchemaMismatch(LayoutMismatchError {
                    missing: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
                    unexpected: Vec::new(),
                    order_differs: false,
                }));
            }
        };
        validate_feature_names(&names)?;

        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let session = Session::builder()
            .map_err(|e| ModelError::InvalidArtifact(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError::InvalidArtifact(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(&bytes)
            .map_err(|e| ModelError::InvalidArtifact(format!("Failed to load model: {}", e)))?;

        let output_name = session.outputs.iter()
            .find(|o| o.name == PROBABILITY_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::InvalidArtifact("No output defined".to_string()))?;

        let metadata = ModelMetadata::for_artifact(path, "onnx", &bytes, 0);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_proba(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, ModelError> {
        let mut input_data = Vec::with_capacity(batch.len() * FEATURE_COUNT);
        for record in batch {
            input_data.extend(record.to_vector().iter().map(|v| *v as f32));
        }

        let input_array = Array2::<f32>::from_shape_vec((batch.len(), FEATURE_COUNT), input_data)
            .map_err(|e| ModelError::Inference(format!("Array error: {}", e)))?;
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ModelError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| ModelError::Inference(format!("No output '{}'", self.output_name)))?;
        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("Extract error: {}", e)))?;

        positive_probabilities(data, batch.len())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// `[batch, 2]` class probabilities, or a single positive column
fn positive_probabilities(data: &[f32], rows: usize) -> Result<Vec<f64>, ModelError> {
    let probabilities: Vec<f64> = if data.len() == rows * 2 {
        data.chunks(2).map(|pair| pair[1] as f64).collect()
    } else if data.len() == rows {
        data.iter().map(|p| *p as f64).collect()
    } else {
        return Err(ModelError::OutputShape { expected: rows, actual: data.len() });
    };

    match probabilities.iter().copied().enumerate().find(|(_, p)| !(0.0..=1.0).contains(p)) {
        Some((index, value)) => Err(ModelError::ProbabilityRange { index, value }),
        None => Ok(probabilities),
    }
}
