//! Feature Layout - Column Definition
//!
//! **This file controls the feature schema**
//!
//! Block order is fixed: time-delta, source-hash, destination-hash,
//! protocol-one-hot, length-scale, info-vectorize. Block widths come from
//! the fitted artifacts, so the layout is built once per extractor.
//!
//! ## Rules (NEVER break these):
//! 1. Add block → increment FEATURE_VERSION
//! 2. Change block order → increment FEATURE_VERSION
//! 3. Change column naming → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout rules change
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// BLOCKS
// ============================================================================

/// Sub-feature groups, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureBlock {
    TimeDelta,
    SourceHash,
    DestinationHash,
    Protocol,
    Length,
    Info,
}

impl FeatureBlock {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureBlock::TimeDelta => "time_delta",
            FeatureBlock::SourceHash => "source_hash",
            FeatureBlock::DestinationHash => "destination_hash",
            FeatureBlock::Protocol => "protocol",
            FeatureBlock::Length => "length",
            FeatureBlock::Info => "info",
        }
    }
}

/// Position of one block inside the vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpan {
    pub block: FeatureBlock,
    pub start: usize,
    pub width: usize,
}

impl BlockSpan {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.width
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Ordered column names plus block boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    names: Vec<String>,
    spans: Vec<BlockSpan>,
    hash: u32,
}

impl FeatureLayout {
    /// Build from per-block column names, given in vector order.
    pub fn from_blocks(blocks: Vec<(FeatureBlock, Vec<String>)>) -> Self {
        let mut names = Vec::new();
        let mut spans = Vec::with_capacity(blocks.len());

        for (block, columns) in blocks {
            spans.push(BlockSpan { block, start: names.len(), width: columns.len() });
            names.extend(columns);
        }

        let hash = compute_layout_hash(&names);
        Self { names, spans, hash }
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn span(&self, block: FeatureBlock) -> Option<BlockSpan> {
        self.spans.iter().find(|s| s.block == block).copied()
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Validate that a fitted model was trained against this layout
    pub fn validate(&self, version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
        if version != FEATURE_VERSION || hash != self.hash {
            return Err(LayoutMismatchError {
                expected_version: FEATURE_VERSION,
                expected_hash: self.hash,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            version: FEATURE_VERSION,
            hash: self.hash,
            feature_count: self.width(),
            blocks: self.spans.clone(),
            feature_names: self.names.clone(),
        }
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + column names, used to detect model/extractor drift
pub fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub blocks: Vec<BlockSpan>,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// TESTS
// ============================================================================
