//! Running Accuracy
//!
//! Counter per predictor, chỉ Consumer Loop ghi.

use serde::Serialize;

use super::types::TrafficClass;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunningAccuracy {
    pub misclassified_count: u64,
    pub total_count: u64,
}

impl RunningAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, predicted: TrafficClass, truth: TrafficClass) {
        self.total_count += 1;
        if predicted != truth {
            self.misclassified_count += 1;
        }
    }

    /// `1 - misclassified / total`; None before the first labeled record
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_count == 0 {
            return None;
        }
        Some(1.0 - self.misclassified_count as f64 / self.total_count as f64)
    }
}
