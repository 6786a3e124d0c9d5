//! Dataset Module - Packet Capture Loading
//!
//! Reads capture exports (one row per packet) with optional ground truth.
//! Failures here are startup errors: nothing is streamed from a bad file.

pub mod record;
pub mod reader;


use std::collections::BTreeMap;
use serde::Serialize;

pub use record::{LabeledRecord, Record};
pub use reader::{load_capture, load_labeled_pair, DatasetError};

use crate::logic::model::TrafficClass;

/// Overview of a loaded capture, logged at startup
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetSummary {
    pub total: usize,
    pub attack: usize,
    pub benign: usize,
    pub unlabeled: usize,
    pub first_time: Option<f64>,
    pub last_time: Option<f64>,
    pub protocols: BTreeMap<String, usize>,
}

impl DatasetSummary {
    pub fn from_records(items: &[LabeledRecord]) -> Self {
        let mut summary = Self {
            total: items.len(),
            first_time: items.first().map(|i| i.record.time),
            last_time: items.last().map(|i| i.record.time),
            ..Default::default()
        };

        for item in items {
            match item.label {
                Some(TrafficClass::Attack) => summary.attack += 1,
                Some(TrafficClass::Benign) => summary.benign += 1,
                None => summary.unlabeled += 1,
            }
            *summary.protocols.entry(item.record.protocol.clone()).or_insert(0) += 1;
        }

        summary
    }

    pub fn is_labeled(&self) -> bool {
        self.total > 0 && self.unlabeled == 0
    }
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records ({} attack, {} benign, {} unlabeled), {} protocols",
            self.total,
            self.attack,
            self.benign,
            self.unlabeled,
            self.protocols.len()
        )?;
        if let (Some(first), Some(last)) = (self.first_time, self.last_time) {
            write!(f, ", time {:.6}..{:.6}", first, last)?;
        }
        Ok(())
    }
}
