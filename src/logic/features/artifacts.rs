//! Fitted Artifacts - Transformer parameters from the batch pipeline
//!
//! Bundle JSON chứa hasher, encoder, scaler, vectorizer đã fit.
//! Load lỗi là fatal lúc startup, không bao giờ per-record.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::encoder::OneHotEncoder;
use super::hashing::FeatureHasher;
use super::layout::{FeatureBlock, FeatureLayout, LayoutMismatchError, FEATURE_VERSION};
use super::scaler::StandardScaler;
use super::tfidf::TfidfVectorizer;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
}

// ============================================================================
// BUNDLE
// ============================================================================

/// Where the time-delta feature starts counting from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeOrigin {
    /// previous_time starts at 0, first delta equals the first timestamp
    #[default]
    Zero,
    /// previous_time starts at the first record's time, first delta is 0
    FirstRecord,
}

fn default_feature_version() -> u8 {
    FEATURE_VERSION
}

/// Every fitted transformer the streaming extractor needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedArtifacts {
    #[serde(default = "default_feature_version")]
    pub feature_version: u8,
    #[serde(default)]
    pub time_origin: TimeOrigin,
    /// Absent → raw delta in seconds
    #[serde(default)]
    pub time_scaler: Option<StandardScaler>,
    /// Shared by the Source and Destination blocks
    pub hasher: FeatureHasher,
    pub protocol_encoder: OneHotEncoder,
    pub length_scaler: StandardScaler,
    pub info_vectorizer: TfidfVectorizer,
}

impl FittedArtifacts {
    /// Load and validate a bundle
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        log::info!("Loading fitted artifacts from: {}", path.display());

        let raw = fs::read_to_string(path)
            .map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
        let artifacts: FittedArtifacts = serde_json::from_str(&raw)
            .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;

        artifacts
            .validate()
            .map_err(|reason| ArtifactError::Invalid { path: path.to_path_buf(), reason })?;

        log::debug!(
            "Artifacts: {} hash buckets, {} protocols, {} info terms",
            artifacts.hasher.n_features,
            artifacts.protocol_encoder.width(),
            artifacts.info_vectorizer.width()
        );
        Ok(artifacts)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.feature_version != FEATURE_VERSION {
            return Err(format!(
                "feature version {} not supported (expected {})",
                self.feature_version, FEATURE_VERSION
            ));
        }
        if self.hasher.n_features == 0 {
            return Err("hasher.n_features must be > 0".to_string());
        }
        if self.protocol_encoder.has_duplicates() {
            return Err("protocol_encoder.categories contains duplicates".to_string());
        }
        if !self.length_scaler.is_finite() {
            return Err("length_scaler has non-finite parameters".to_string());
        }
        if let Some(scaler) = &self.time_scaler {
            if !scaler.is_finite() {
                return Err("time_scaler has non-finite parameters".to_string());
            }
        }
        self.info_vectorizer.validate()
    }

    /// Column layout produced by these artifacts
    pub fn layout(&self) -> FeatureLayout {
        FeatureLayout::from_blocks(vec![
            (FeatureBlock::TimeDelta, vec!["time_delta".to_string()]),
            (FeatureBlock::SourceHash, self.hasher.column_names("source_hash")),
            (FeatureBlock::DestinationHash, self.hasher.column_names("destination_hash")),
            (FeatureBlock::Protocol, self.protocol_encoder.column_names()),
            (FeatureBlock::Length, vec!["length".to_string()]),
            (FeatureBlock::Info, self.info_vectorizer.column_names()),
        ])
    }
}

// ============================================================================
// CHECKSUMS
// ============================================================================

/// Hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Verify a file against an expected hex SHA-256 (case-insensitive)
pub fn verify_checksum(path: &Path, expected: &str) -> Result<(), ArtifactError> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ArtifactError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_lowercase(),
            actual,
        });
    }
    log::debug!("Checksum verified: {}", path.display());
    Ok(())
}
