//! Capture Reader
//!
//! Đọc capture CSV export (Wireshark-style columns) thành `LabeledRecord`.
//! Schema được kiểm tra một lần lúc mở file; lỗi là fatal lúc startup.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::record::{LabeledRecord, Record};
use crate::logic::model::TrafficClass;

/// Columns every capture export must carry
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "No.",
    "Time",
    "Source",
    "Destination",
    "Protocol",
    "Length",
    "Info",
];

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("dataset {path}, line {line}: {source}")]
    Row {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {path}, line {line}: invalid label '{value}' (expected 0 or 1)")]
    InvalidLabel { path: PathBuf, line: u64, value: String },
}

// ============================================================================
// READING
// ============================================================================

/// Load a capture in file order.
///
/// When `label_column` names a column present in the header, every row must
/// carry a 0/1 label there. A configured but absent column yields an
/// unlabeled capture.
pub fn load_capture(path: &Path, label_column: Option<&str>) -> Result<Vec<LabeledRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| DatasetError::Open { path: path.to_path_buf(), source })?;

    let headers = reader
        .headers()
        .map_err(|source| DatasetError::Open { path: path.to_path_buf(), source })?
        .clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DatasetError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let label_index = label_column.and_then(|name| headers.iter().position(|h| h == name));
    match (label_column, label_index) {
        (Some(name), None) => log::debug!("{}: no '{}' column, capture is unlabeled", path.display(), name),
        (Some(name), Some(_)) => log::debug!("{}: ground truth from '{}' column", path.display(), name),
        _ => {}
    }

    let mut items = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|source| DatasetError::Row {
            path: path.to_path_buf(),
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let record: Record = row.deserialize(Some(&headers)).map_err(|source| DatasetError::Row {
            path: path.to_path_buf(),
            line,
            source,
        })?;

        let label = match label_index {
            Some(index) => Some(parse_label(row.get(index).unwrap_or(""), path, line)?),
            None => None,
        };

        items.push(LabeledRecord::new(record, label));
    }

    log::info!("Loaded {} records from {}", items.len(), path.display());
    Ok(items)
}

/// Combine an attack capture and a benign capture into one labeled dataset:
/// attack rows first (label 1), then benign rows (label 0).
pub fn load_labeled_pair(attack: &Path, benign: &Path) -> Result<Vec<LabeledRecord>, DatasetError> {
    let attack_rows = load_capture(attack, None)?;
    let benign_rows = load_capture(benign, None)?;

    let mut items = Vec::with_capacity(attack_rows.len() + benign_rows.len());
    items.extend(
        attack_rows
            .into_iter()
            .map(|item| LabeledRecord::new(item.record, Some(TrafficClass::Attack))),
    );
    items.extend(
        benign_rows
            .into_iter()
            .map(|item| LabeledRecord::new(item.record, Some(TrafficClass::Benign))),
    );
    Ok(items)
}

fn parse_label(raw: &str, path: &Path, line: u64) -> Result<TrafficClass, DatasetError> {
    let value = raw.trim();
    let numeric = value
        .parse::<u8>()
        .ok()
        .or_else(|| match value.parse::<f64>() {
            Ok(v) if v == 0.0 => Some(0),
            Ok(v) if v == 1.0 => Some(1),
            _ => None,
        });

    numeric
        .and_then(TrafficClass::from_label)
        .ok_or_else(|| DatasetError::InvalidLabel {
            path: path.to_path_buf(),
            line,
            value: value.to_string(),
        })
}
