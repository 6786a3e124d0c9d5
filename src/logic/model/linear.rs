//! Linear Classifier
//!
//! Logistic model lưu dạng JSON (weights + bias + threshold + layout hash).
//! Dùng khi không có ONNX runtime hoặc cho model nhỏ export trực tiếp.

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError};
use super::types::TrafficClass;
use crate::logic::dataset::Record;
use crate::logic::features::FeatureVector;

fn default_threshold() -> f32 {
    0.5
}

/// Serialized logistic-regression parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub weights: Vec<f32>,
    pub bias: f32,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

impl LinearModel {
    /// Attack probability
    pub fn score(&self, values: &[f32]) -> f32 {
        let z: f32 = self
            .weights
            .iter()
            .zip(values.iter())
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias;
        1.0 / (1.0 + (-z).exp())
    }
}

pub struct LinearClassifier {
    name: String,
    model: LinearModel,
}

impl LinearClassifier {
    pub fn new(name: &str, model: LinearModel) -> Self {
        Self { name: name.to_string(), model }
    }

    pub fn load(name: &str, path: &Path) -> Result<Self, ClassifierError> {
        log::info!("Loading linear model '{}' from: {}", name, path.display());

        let load_err = |reason: String| ClassifierError::Load { path: path.to_path_buf(), reason };

        let raw = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let model: LinearModel = serde_json::from_str(&raw).map_err(|e| load_err(e.to_string()))?;

        if model.weights.iter().any(|w| !w.is_finite()) || !model.bias.is_finite() {
            return Err(load_err("non-finite weights".to_string()));
        }
        if !(0.0..=1.0).contains(&model.threshold) {
            return Err(load_err(format!("threshold {} outside [0, 1]", model.threshold)));
        }

        Ok(Self::new(name, model))
    }
}

impl Classifier for LinearClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_width(&self) -> Option<usize> {
        Some(self.model.weights.len())
    }

    fn fitted_layout(&self) -> Option<(u8, u32)> {
        Some((self.model.feature_version, self.model.layout_hash))
    }

    fn predict(&mut self, record: &Record, features: &FeatureVector) -> Result<TrafficClass, ClassifierError> {
        if features.width() != self.model.weights.len() {
            return Err(ClassifierError::Inference {
                name: self.name.clone(),
                sequence_no: record.sequence_no,
                reason: format!(
                    "got {} features, model has {} weights",
                    features.width(),
                    self.model.weights.len()
                ),
            });
        }

        if self.model.score(features.as_slice()) >= self.model.threshold {
            Ok(TrafficClass::Attack)
        } else {
            Ok(TrafficClass::Benign)
        }
    }
}
