use serde::{Deserialize, Serialize};
use crate::logic::model::TrafficClass;

/// One packet observation from a capture export
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Record {
    #[serde(rename = "No.")]
    pub sequence_no: u64,
    #[serde(rename = "Time")]
    pub time: f64,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    #[serde(rename = "Length")]
    pub length: u32,
    #[serde(rename = "Info", default)]
    pub info: String,
}

/// Record paired with its ground truth, when the capture is labeled
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub record: Record,
    pub label: Option<TrafficClass>,
}

impl LabeledRecord {
    pub fn new(record: Record, label: Option<TrafficClass>) -> Self {
        Self { record, label }
    }
}
