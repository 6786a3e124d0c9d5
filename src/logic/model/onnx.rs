//! ONNX Classifier - ONNX Runtime Integration
//!
//! Load model đã convert từ batch training và chạy predict cho từng vector.
//! Input `[1, width]` f32; output đầu tiên là label (i64) hoặc score (f32).

use std::path::Path;
use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::classifier::{Classifier, ClassifierError};
use super::types::TrafficClass;
use crate::logic::dataset::Record;
use crate::logic::features::FeatureVector;

/// Score at or above this is an attack when the model emits probabilities
const SCORE_THRESHOLD: f32 = 0.5;

pub struct OnnxClassifier {
    name: String,
    session: Session,
    output_name: String,
    input_width: usize,
}

/// Width check against the model's declared input `[batch, width]`.
///
/// The last dimension is the feature width; `-1` means dynamic. A dynamic
/// width needs `input_width` in the config, otherwise nothing can be checked
/// before the first record and the model is refused.
fn resolve_input_width(configured: Option<usize>, declared: Option<&[i64]>) -> Result<usize, String> {
    let declared = declared
        .and_then(|dims| dims.last().copied())
        .and_then(|d| usize::try_from(d).ok())
        .filter(|&d| d > 0);

    match (configured, declared) {
        (Some(configured), Some(declared)) if configured != declared => Err(format!(
            "configured input_width {} disagrees with model input width {}",
            configured, declared
        )),
        (Some(width), _) | (None, Some(width)) => Ok(width),
        (None, None) => Err("model input width is dynamic; set input_width in the config".to_string()),
    }
}

impl OnnxClassifier {
    /// Load ONNX model từ file
    pub fn load(name: &str, model_path: &Path, input_width: Option<usize>) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX model '{}' from: {}", name, model_path.display());

        let load_err = |reason: String| ClassifierError::Load {
            path: model_path.to_path_buf(),
            reason,
        };

        if !model_path.exists() {
            return Err(load_err("file not found".to_string()));
        }

        let session = Session::builder()
            .map_err(|e| load_err(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_err(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| load_err(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| load_err("No output defined".to_string()))?;

        let declared = session
            .inputs
            .first()
            .and_then(|input| input.input_type.tensor_shape())
            .map(|shape| shape.to_vec());
        let input_width = resolve_input_width(input_width, declared.as_deref()).map_err(load_err)?;

        log::info!(
            "ONNX model '{}' loaded (input width: {}, output: {})",
            name, input_width, output_name
        );

        Ok(Self {
            name: name.to_string(),
            session,
            output_name,
            input_width,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_width(&self) -> Option<usize> {
        Some(self.input_width)
    }

    fn predict(&mut self, record: &Record, features: &FeatureVector) -> Result<TrafficClass, ClassifierError> {
        let name = self.name.clone();
        let fail = |reason: String| ClassifierError::Inference {
            name: name.clone(),
            sequence_no: record.sequence_no,
            reason,
        };

        let input_array = Array2::<f32>::from_shape_vec((1, features.width()), features.values.clone())
            .map_err(|e| fail(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| fail(format!("Tensor error: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| fail(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| fail("No output".to_string()))?;

        let label = if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
            labels.first().map(|&l| l != 0)
        } else if let Ok((_, scores)) = output.try_extract_tensor::<f32>() {
            scores.first().map(|&s| s >= SCORE_THRESHOLD)
        } else {
            None
        };

        match label {
            Some(true) => Ok(TrafficClass::Attack),
            Some(false) => Ok(TrafficClass::Benign),
            None => Err(fail("unsupported or empty output tensor".to_string())),
        }
    }
}
