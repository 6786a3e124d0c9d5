//! Streaming Feature Extractor
//!
//! Biến một `Record` thành `FeatureVector`, theo đúng thứ tự arrival.
//! Giữ `previous_time` giữa các lần gọi để time-delta khớp với batch pipeline.
//! Một instance cho một stream; không bao giờ share giữa các stream.

use thiserror::Error;

use super::artifacts::{FittedArtifacts, TimeOrigin};
use super::layout::{FeatureBlock, FeatureLayout};
use super::vector::FeatureVector;
use crate::logic::dataset::Record;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("record {sequence_no}: time {time} is not a finite number")]
    NonFiniteTime { sequence_no: u64, time: f64 },

    #[error("record {sequence_no}: {reason}")]
    Malformed { sequence_no: u64, reason: String },
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Stateful record → vector transform. Must be called in arrival order.
pub trait FeatureExtractor {
    fn layout(&self) -> &FeatureLayout;

    fn extract(&mut self, record: &Record) -> Result<FeatureVector, ExtractError>;

    fn width(&self) -> usize {
        self.layout().width()
    }
}

// ============================================================================
// STATE
// ============================================================================

/// Cross-record state needed for train/serve parity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorState {
    pub previous_time: f64,
    primed: bool,
}

impl ExtractorState {
    pub fn new(origin: TimeOrigin) -> Self {
        Self {
            previous_time: 0.0,
            primed: origin == TimeOrigin::Zero,
        }
    }

    /// Delta to the previous extracted record, then remember `time`
    pub fn advance(&mut self, time: f64) -> f64 {
        if !self.primed {
            self.previous_time = time;
            self.primed = true;
        }
        let delta = time - self.previous_time;
        self.previous_time = time;
        delta
    }
}

// ============================================================================
// STREAMING EXTRACTOR
// ============================================================================

pub struct StreamingExtractor {
    artifacts: FittedArtifacts,
    layout: FeatureLayout,
    state: ExtractorState,
}

impl StreamingExtractor {
    pub fn new(artifacts: FittedArtifacts) -> Self {
        let layout = artifacts.layout();
        let state = ExtractorState::new(artifacts.time_origin);
        Self { artifacts, layout, state }
    }

    pub fn previous_time(&self) -> f64 {
        self.state.previous_time
    }

    fn block<'a>(&self, values: &'a mut [f32], block: FeatureBlock) -> &'a mut [f32] {
        match self.layout.span(block) {
            Some(span) => &mut values[span.range()],
            None => &mut [],
        }
    }
}

impl FeatureExtractor for StreamingExtractor {
    fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    fn extract(&mut self, record: &Record) -> Result<FeatureVector, ExtractError> {
        // A rejected row leaves previous_time untouched
        if !record.time.is_finite() {
            return Err(ExtractError::NonFiniteTime {
                sequence_no: record.sequence_no,
                time: record.time,
            });
        }

        let mut values = vec![0.0f32; self.layout.width()];

        let saved = self.state;
        let delta = self.state.advance(record.time);
        let time_value = match &self.artifacts.time_scaler {
            Some(scaler) => scaler.transform(delta),
            None => delta as f32,
        };
        self.block(&mut values, FeatureBlock::TimeDelta)[0] = time_value;

        let hasher = &self.artifacts.hasher;
        hasher.transform_into(&record.source, self.block(&mut values, FeatureBlock::SourceHash));
        hasher.transform_into(&record.destination, self.block(&mut values, FeatureBlock::DestinationHash));

        self.artifacts
            .protocol_encoder
            .transform_into(&record.protocol, self.block(&mut values, FeatureBlock::Protocol));

        self.block(&mut values, FeatureBlock::Length)[0] =
            self.artifacts.length_scaler.transform(record.length as f64);

        self.artifacts
            .info_vectorizer
            .transform_into(&record.info, self.block(&mut values, FeatureBlock::Info));

        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            self.state = saved;
            return Err(ExtractError::Malformed {
                sequence_no: record.sequence_no,
                reason: format!("feature '{}' is not finite", self.layout.names()[bad]),
            });
        }

        Ok(FeatureVector::from_values(self.layout.hash(), values))
    }
}
