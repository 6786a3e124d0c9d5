//! Features Module - Feature Extraction Engine
//!
//! Tách logic trích xuất features từ raw packet records.
//! Mỗi sub-transform (hashing, one-hot, scaling, tf-idf) là một file riêng;
//! `extractor` ghép chúng theo layout cố định.

pub mod layout;
pub mod vector;
pub mod hashing;
pub mod encoder;
pub mod scaler;
pub mod tfidf;
pub mod artifacts;
pub mod extractor;

#[cfg(test)]
pub(crate) mod tests;

// Re-export common types
pub use artifacts::{verify_checksum, ArtifactError, FittedArtifacts};
pub use extractor::{ExtractError, FeatureExtractor, StreamingExtractor};
pub use layout::{FeatureLayout, LayoutInfo, LayoutMismatchError, FEATURE_VERSION};
pub use vector::FeatureVector;
