//! Demo Configuration
//!
//! Configuration for one streaming run.
//! Precedence: CLI flags > config file > environment > built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::logic::model::RuleConfig;
use crate::logic::stream::DisplayMode;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Onnx,
    Linear,
}

/// One fitted model to run side by side with the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub kind: ModelKind,
    pub path: PathBuf,
    /// Expected SHA-256 (hex) of the model file
    #[serde(default)]
    pub sha256: Option<String>,
    /// Input width the model was fitted with (ONNX only)
    #[serde(default)]
    pub input_width: Option<usize>,
}

/// Where records come from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Single capture, labeled if it carries `label_column`
    pub capture: Option<PathBuf>,
    /// Unlabeled attack capture (labeled 1 on load)
    pub attack: Option<PathBuf>,
    /// Unlabeled benign capture (labeled 0 on load)
    pub benign: Option<PathBuf>,
    pub label_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    Capture { path: PathBuf, label_column: String },
    Pair { attack: PathBuf, benign: PathBuf },
}

impl DatasetConfig {
    pub fn resolve(&self) -> Result<DatasetSource, ConfigError> {
        match (&self.capture, &self.attack, &self.benign) {
            (Some(path), None, None) => Ok(DatasetSource::Capture {
                path: path.clone(),
                label_column: self
                    .label_column
                    .clone()
                    .unwrap_or_else(|| constants::DEFAULT_LABEL_COLUMN.to_string()),
            }),
            (None, Some(attack), Some(benign)) => Ok(DatasetSource::Pair {
                attack: attack.clone(),
                benign: benign.clone(),
            }),
            (None, None, None) => Err(ConfigError::Invalid("no dataset configured".into())),
            _ => Err(ConfigError::Invalid(
                "use either one capture or an attack + benign pair".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub enabled: bool,
    /// Defaults to the local data directory
    pub dir: Option<PathBuf>,
    /// Rotate to a new file past this size
    pub max_file_mb: u64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: None,
            max_file_mb: crate::logic::stream::journal::DEFAULT_MAX_FILE_MB,
        }
    }
}

// ============================================================================
// DEMO CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub dataset: DatasetConfig,
    /// Fitted transformer bundle (JSON)
    pub artifacts: Option<PathBuf>,
    pub artifacts_sha256: Option<String>,
    pub models: Vec<ModelSpec>,
    pub rules: RuleConfig,
    /// Delay between emitted records
    pub pace_ms: u64,
    /// Pause / cancellation polling tick
    pub poll_ms: u64,
    pub queue_capacity: usize,
    pub attack_drop_probability: f64,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub display_mode: DisplayMode,
    pub debounce_ms: u64,
    /// Same-key presses closer than this are one held key (no-release terminals)
    pub repeat_delay_ms: u64,
    pub color: bool,
    pub journal: JournalConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            artifacts: None,
            artifacts_sha256: None,
            models: Vec::new(),
            rules: RuleConfig::default(),
            pace_ms: constants::get_pace_ms(),
            poll_ms: constants::get_poll_ms(),
            queue_capacity: constants::get_queue_capacity(),
            attack_drop_probability: constants::get_attack_drop_probability(),
            shuffle: true,
            seed: constants::get_seed(),
            display_mode: DisplayMode::All,
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,
            repeat_delay_ms: constants::DEFAULT_REPEAT_DELAY_MS,
            color: true,
            journal: JournalConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Unpaced, unfiltered, file order. For batch-style checks of the stream.
    pub fn fast() -> Self {
        Self {
            pace_ms: 0,
            attack_drop_probability: 0.0,
            shuffle: false,
            ..Default::default()
        }
    }

    /// Slower pacing for a live walkthrough
    pub fn presentation() -> Self {
        Self {
            pace_ms: 500,
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_ms == 0 {
            return Err(ConfigError::Invalid("poll_ms must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.attack_drop_probability) {
            return Err(ConfigError::Invalid(format!(
                "attack_drop_probability {} outside [0, 1]",
                self.attack_drop_probability
            )));
        }
        if self.journal.max_file_mb == 0 {
            return Err(ConfigError::Invalid("journal.max_file_mb must be positive".into()));
        }
        if self.artifacts.is_none() {
            return Err(ConfigError::Invalid("no fitted artifact bundle configured".into()));
        }
        if self.models.is_empty() && !self.rules.enabled {
            return Err(ConfigError::Invalid("no classifier configured".into()));
        }
        if self.rules.burst_threshold_secs < 0.0 || !self.rules.burst_threshold_secs.is_finite() {
            return Err(ConfigError::Invalid("burst_threshold_secs must be a non-negative number".into()));
        }

        let mut names: Vec<&str> = self.models.iter().map(|m| m.name.as_str()).collect();
        if self.rules.enabled {
            names.push("rules");
        }
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        if names.len() != total {
            return Err(ConfigError::Invalid("classifier names must be unique".into()));
        }

        self.dataset.resolve()?;
        Ok(())
    }

    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn repeat_delay(&self) -> Duration {
        Duration::from_millis(self.repeat_delay_ms)
    }

    pub fn journal_dir(&self) -> PathBuf {
        self.journal
            .dir
            .clone()
            .unwrap_or_else(crate::logic::stream::Journal::default_dir)
    }

    pub fn journal_max_bytes(&self) -> u64 {
        self.journal.max_file_mb.saturating_mul(1024 * 1024)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> DemoConfig {
        DemoConfig {
            dataset: DatasetConfig {
                capture: Some(PathBuf::from("capture.csv")),
                ..Default::default()
            },
            artifacts: Some(PathBuf::from("artifacts.json")),
            ..DemoConfig::fast()
        }
    }

    #[test]
    fn test_default_config_uses_constants() {
        let config = DemoConfig::default();
        assert_eq!(config.debounce_ms, constants::DEFAULT_DEBOUNCE_MS);
        assert!(config.rules.enabled);
        assert_eq!(config.display_mode, DisplayMode::All);
    }

    #[test]
    fn test_fast_preset() {
        let config = DemoConfig::fast();
        assert_eq!(config.pace_ms, 0);
        assert_eq!(config.attack_drop_probability, 0.0);
        assert!(!config.shuffle);
    }

    #[test]
    fn test_presentation_preset_slows_pacing() {
        let config = DemoConfig::presentation();
        assert!(config.pace_ms > DemoConfig::default().pace_ms);
        assert_eq!(config.journal_max_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_validate_accepts_minimal() {
        valid().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = valid();
        config.poll_ms = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.attack_drop_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.journal.max_file_mb = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.rules.enabled = false;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_dataset_sources_are_exclusive() {
        let mut config = valid();
        config.dataset.attack = Some(PathBuf::from("attack.csv"));
        assert!(config.validate().is_err());

        let pair = DatasetConfig {
            attack: Some(PathBuf::from("a.csv")),
            benign: Some(PathBuf::from("b.csv")),
            ..Default::default()
        };
        assert!(matches!(pair.resolve(), Ok(DatasetSource::Pair { .. })));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut config = valid();
        config.models.push(ModelSpec {
            name: "rules".into(),
            kind: ModelKind::Linear,
            path: PathBuf::from("m.json"),
            sha256: None,
            input_width: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        std::fs::write(
            &path,
            r#"{"pace_ms": 5, "display_mode": "attack_only", "dataset": {"capture": "x.csv"}}"#,
        )
        .unwrap();

        let config = DemoConfig::load(&path).unwrap();
        assert_eq!(config.pace_ms, 5);
        assert_eq!(config.display_mode, DisplayMode::AttackOnly);
        assert_eq!(config.dataset.capture, Some(PathBuf::from("x.csv")));
    }
}
