//! Standard Scaling cho numeric columns (Length, optional time delta).

use serde::{Deserialize, Serialize};

/// Fitted single-column standard scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    pub fn identity() -> Self {
        Self { mean: 0.0, scale: 1.0 }
    }

    /// `(x - mean) / scale`; a zero scale (constant column at fit time) acts as 1
    pub fn transform(&self, value: f64) -> f32 {
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        ((value - self.mean) / scale) as f32
    }

    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.scale.is_finite()
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling() {
        let scaler = StandardScaler { mean: 100.0, scale: 50.0 };
        assert_eq!(scaler.transform(150.0), 1.0);
        assert_eq!(scaler.transform(100.0), 0.0);
    }

    #[test]
    fn test_zero_scale_is_safe() {
        let scaler = StandardScaler { mean: 60.0, scale: 0.0 };
        assert_eq!(scaler.transform(61.0), 1.0);
    }
}
