//! Decision Forest - JSON tree-ensemble artifact
//!
//! Artifact shape:
//!
//! ```json
//! {
//!   "format": "decision-forest",
//!   "feature_names": ["atm_age_years", "..."],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 5, "threshold": 130.0, "left": 1, "right": 2 },
//!         { "value": [0.97, 0.03] },
//!         { "value": [0.1, 0.9] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A split sends a record left when `x[feature] <= threshold`. Leaves hold the
//! class distribution `[p_negative, p_positive]`; the forest probability is
//! the mean positive share over all trees.

use std::path::Path;

use serde::Deserialize;

use crate::logic::features::{validate_feature_names, FeatureRecord, FEATURE_COUNT};
use super::inference::{Classifier, ModelError, ModelMetadata};

pub const FOREST_FORMAT: &str = "decision-forest";

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
struct ForestArtifact {
    format: String,
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

/// Loaded, validated forest
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    trees: Vec<Tree>,
    metadata: ModelMetadata,
}

impl ForestClassifier {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(path, &bytes)
    }

    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        if artifact.format != FOREST_FORMAT {
            return Err(ModelError::UnsupportedFormat(format!(
                "artifact format '{}' (expected '{}')",
                artifact.format, FOREST_FORMAT
            )));
        }

        validate_feature_names(&artifact.feature_names)?;

        if artifact.trees.is_empty() {
            return Err(ModelError::InvalidArtifact("forest has no trees".to_string()));
        }
        for (index, tree) in artifact.trees.iter().enumerate() {
            validate_tree(tree).map_err(|reason| {
                ModelError::InvalidArtifact(format!("tree {}: {}", index, reason))
            })?;
        }

        let metadata = ModelMetadata::for_artifact(path, FOREST_FORMAT, bytes, artifact.trees.len());
        Ok(Self { trees: artifact.trees, metadata })
    }

    fn probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| leaf_value(tree, x)[1]).sum();
        total / self.trees.len() as f64
    }
}

impl Classifier for ForestClassifier {
    fn predict_proba(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, ModelError> {
        Ok(batch.iter().map(|record| self.probability(&record.to_vector())).collect())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Children must point forward, so every walk terminates.
fn validate_tree(tree: &Tree) -> Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("no nodes".to_string());
    }

    let len = tree.nodes.len();
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Split { feature, threshold, left, right } => {
                if *feature >= FEATURE_COUNT {
                    return Err(format!("node {} splits on feature {} (have {})", i, feature, FEATURE_COUNT));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has non-finite threshold", i));
                }
                for child in [left, right] {
                    if *child <= i || *child >= len {
                        return Err(format!("node {} has invalid child index {}", i, child));
                    }
                }
            }
            Node::Leaf { value } => {
                if value.iter().any(|p| !(0.0..=1.0).contains(p)) {
                    return Err(format!("node {} has leaf value outside [0, 1]", i));
                }
                if (value[0] + value[1] - 1.0).abs() > LEAF_SUM_TOLERANCE {
                    return Err(format!(
                        "node {} leaf probabilities sum to {} (expected 1)",
                        i,
                        value[0] + value[1]
                    ));
                }
            }
        }
    }
    Ok(())
}

fn leaf_value(tree: &Tree, x: &[f64; FEATURE_COUNT]) -> [f64; 2] {
    let mut index = 0;
    loop {
        match &tree.nodes[index] {
            Node::Leaf { value } => return *value,
            Node::Split { feature, threshold, left, right } => {
                index = if x[*feature] <= *threshold { *left } else { *right };
            }
        }
    }
}

/// Allowed drift of `p_neg + p_pos` from 1 in a leaf
const LEAF_SUM_TOLERANCE: f64 = 1e-6;
