//! Logic Module - Streaming Demo Engine
//!
//! Chứa các engines xử lý: dataset, features, model, stream.
//!
//! ## Architecture
//! - `dataset/` - Capture loading (CSV, labels, summary)
//! - `features/` - Streaming feature extraction (hash, one-hot, scale, tf-idf)
//! - `model/` - Predictors (ONNX, linear, rule engine) + running accuracy
//! - `stream/` - Replay, control, pipeline, consumer, coordinator

// Core modules
pub mod config;
pub mod error;
pub mod setup;

// Engines
pub mod dataset;
pub mod features;
pub mod model;
pub mod stream;
