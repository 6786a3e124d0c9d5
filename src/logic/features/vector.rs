//! Feature Vector - Core data structure for ML input
//!
//! Width is fixed per extractor (decided by the fitted artifacts), so the
//! values live in a `Vec<f32>` tagged with the layout hash it was built for.

use serde::{Deserialize, Serialize};
use super::layout::FEATURE_VERSION;

/// Versioned Feature Vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in layout order
    pub values: Vec<f32>,
}

impl FeatureVector {
    /// Wrap raw values, tagging them with the layout hash
    pub fn from_values(layout_hash: u32, values: Vec<f32>) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
