//! Model Module - Prediction Engine
//!
//! Tách logic inference khỏi feature extraction.
//! Nhiều predictor chạy song song trên cùng một record (ONNX, linear, rules).

pub mod types;
pub mod classifier;
pub mod onnx;
pub mod linear;
pub mod rules;
pub mod accuracy;

// Re-export common types
pub use accuracy::RunningAccuracy;
pub use classifier::{check_compatibility, Classifier, ClassifierError};
pub use linear::LinearClassifier;
pub use onnx::OnnxClassifier;
pub use rules::{RuleConfig, RuleEngine};
pub use types::TrafficClass;
