//! Run Journal
//!
//! JSONL log của mỗi row đã classify. Rotate khi file vượt 10 MB.
//! Chỉ Consumer Loop ghi, nên không cần lock.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::model::TrafficClass;

/// Default rotation size in MB
pub const DEFAULT_MAX_FILE_MB: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalPrediction {
    pub predictor: String,
    pub label: TrafficClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub sequence_no: u64,
    pub capture_time: f64,
    pub layout_hash: u32,
    pub predictions: Vec<JournalPrediction>,
    pub ground_truth: Option<TrafficClass>,
}

pub struct Journal {
    file: Option<File>,
    base_dir: PathBuf,
    run_id: Uuid,
    max_size: u64,
}

impl Journal {
    /// Default location: `<data_local_dir>/packet-shield/runs`
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("packet-shield")
            .join("runs")
    }

    pub fn open(base_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(base_dir)?;
        let run_id = Uuid::new_v4();
        log::info!("Journal for run {} in {}", run_id, base_dir.display());

        Ok(Self {
            file: None,
            base_dir: base_dir.to_path_buf(),
            run_id,
            max_size: DEFAULT_MAX_FILE_MB * 1024 * 1024,
        })
    }

    /// Rotation threshold in bytes
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn entry(
        &self,
        sequence_no: u64,
        capture_time: f64,
        layout_hash: u32,
        predictions: Vec<JournalPrediction>,
        ground_truth: Option<TrafficClass>,
    ) -> JournalEntry {
        JournalEntry {
            run_id: self.run_id,
            timestamp: Utc::now(),
            sequence_no,
            capture_time,
            layout_hash,
            predictions,
            ground_truth,
        }
    }

    /// Append one line, rotating first if the current file is full
    pub fn append(&mut self, entry: &JournalEntry) -> io::Result<()> {
        let should_rotate = match self.file.as_ref() {
            Some(f) => f.metadata()?.len() >= self.max_size,
            None => true,
        };

        if should_rotate {
            self.file = Some(self.create_new_file()?);
        }

        if let Some(file) = self.file.as_mut() {
            let json = serde_json::to_string(entry)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    /// Files one run wrote into `base_dir`, oldest first
    pub fn run_files(base_dir: &Path, run_id: Uuid) -> io::Result<Vec<PathBuf>> {
        let prefix = format!("run-{}-", run_id.simple());
        let mut entries = fs::read_dir(base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .filter(|p| {
                p.file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| name.starts_with(&prefix))
            })
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }

    fn create_new_file(&self) -> io::Result<File> {
        let now = Utc::now();
        // run-<id>-YYYY-MM-DD-HHMMSS-micros: sortable, unique per rotation
        let filename = format!(
            "run-{}-{}.jsonl",
            self.run_id.simple(),
            now.format("%Y-%m-%d-%H%M%S-%6f")
        );
        let path = self.base_dir.join(filename);

        OpenOptions::new().create(true).append(true).open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictions() -> Vec<JournalPrediction> {
        vec![JournalPrediction { predictor: "rules".into(), label: TrafficClass::Benign }]
    }

    #[test]
    fn test_append_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::open(dir.path()).unwrap();

        for n in 1..=3 {
            let entry = journal.entry(n, n as f64, 42, predictions(), Some(TrafficClass::Benign));
            journal.append(&entry).unwrap();
        }

        let files = Journal::run_files(dir.path(), journal.run_id()).unwrap();
        assert_eq!(files.len(), 1);
        let content = std::fs::read_to_string(&files[0]).unwrap();
        let lines: Vec<JournalEntry> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].sequence_no, 3);
        assert_eq!(lines[0].run_id, journal.run_id());
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::open(dir.path()).unwrap().with_max_size(1);

        let first = journal.entry(1, 0.0, 42, predictions(), None);
        journal.append(&first).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = journal.entry(2, 0.1, 42, predictions(), None);
        journal.append(&second).unwrap();

        assert_eq!(Journal::run_files(dir.path(), journal.run_id()).unwrap().len(), 2);

        // Another run in the same directory is not counted
        let mut other = Journal::open(dir.path()).unwrap();
        let entry = other.entry(1, 0.0, 42, predictions(), None);
        other.append(&entry).unwrap();
        assert_eq!(Journal::run_files(dir.path(), journal.run_id()).unwrap().len(), 2);
    }
}
