//! Classifier Contract
//!
//! CHỈ chứa trait + error + compatibility check.
//! Input: Record + FeatureVector. Output: TrafficClass.

use std::path::PathBuf;
use thiserror::Error;

use super::types::TrafficClass;
use crate::logic::dataset::Record;
use crate::logic::features::{ArtifactError, FeatureLayout, FeatureVector, LayoutMismatchError};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("cannot load model {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("model '{name}' expects {expected} features but the extractor produces {actual}")]
    WidthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("model '{name}': {source}")]
    Layout {
        name: String,
        #[source]
        source: LayoutMismatchError,
    },

    #[error("model '{name}' failed on record {sequence_no}: {reason}")]
    Inference {
        name: String,
        sequence_no: u64,
        reason: String,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// One predictor in the side-by-side set.
///
/// Fitted models ignore `record`; the rule engine reads timing and length
/// from it and keeps its own burst memory.
pub trait Classifier: Send {
    fn name(&self) -> &str;

    /// Input width the model was fitted against, when known
    fn expected_width(&self) -> Option<usize> {
        None
    }

    /// (feature version, layout hash) the model was fitted against, when recorded
    fn fitted_layout(&self) -> Option<(u8, u32)> {
        None
    }

    fn predict(&mut self, record: &Record, features: &FeatureVector) -> Result<TrafficClass, ClassifierError>;
}

/// Startup parity check between a classifier and the extractor layout.
/// Any mismatch is a fatal configuration error.
pub fn check_compatibility(classifier: &dyn Classifier, layout: &FeatureLayout) -> Result<(), ClassifierError> {
    if let Some(expected) = classifier.expected_width() {
        if expected != layout.width() {
            return Err(ClassifierError::WidthMismatch {
                name: classifier.name().to_string(),
                expected,
                actual: layout.width(),
            });
        }
    }

    if let Some((version, hash)) = classifier.fitted_layout() {
        layout.validate(version, hash).map_err(|source| ClassifierError::Layout {
            name: classifier.name().to_string(),
            source,
        })?;
    }

    Ok(())
}
