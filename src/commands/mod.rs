//! Command handlers. Each `execute` returns the process exit code.

pub mod check;
pub mod demo;
pub mod layout;

use std::path::PathBuf;
use anyhow::{bail, Context};

use crate::cli::{PresetArg, SourceArgs};
use crate::logic::config::{DemoConfig, ModelKind, ModelSpec};

pub const SUCCESS: i32 = 0;
pub const EXECUTION_ERROR: i32 = 1;

/// `NAME=PATH`
fn parse_model(raw: &str, kind: ModelKind) -> anyhow::Result<ModelSpec> {
    let Some((name, path)) = raw.split_once('=') else {
        bail!("expected NAME=PATH, got '{}'", raw);
    };
    if name.trim().is_empty() || path.trim().is_empty() {
        bail!("expected NAME=PATH, got '{}'", raw);
    }
    Ok(ModelSpec {
        name: name.trim().to_string(),
        kind,
        path: PathBuf::from(path.trim()),
        sha256: None,
        input_width: None,
    })
}

/// Config file (or defaults) with the shared source flags applied on top
pub fn load_config(source: &SourceArgs) -> anyhow::Result<DemoConfig> {
    let mut config = match (&source.config, source.preset) {
        (Some(path), _) => DemoConfig::load(path)?,
        (None, Some(PresetArg::Fast)) => DemoConfig::fast(),
        (None, Some(PresetArg::Presentation)) => DemoConfig::presentation(),
        (None, None) => DemoConfig::default(),
    };

    if let Some(capture) = &source.capture {
        config.dataset.capture = Some(capture.clone());
        config.dataset.attack = None;
        config.dataset.benign = None;
    }
    if let (Some(attack), Some(benign)) = (&source.attack, &source.benign) {
        config.dataset.capture = None;
        config.dataset.attack = Some(attack.clone());
        config.dataset.benign = Some(benign.clone());
    }
    if let Some(column) = &source.label_column {
        config.dataset.label_column = Some(column.clone());
    }
    if let Some(artifacts) = &source.artifacts {
        config.artifacts = Some(artifacts.clone());
    }
    if let Some(sha) = &source.artifacts_sha256 {
        config.artifacts_sha256 = Some(sha.clone());
    }

    for raw in &source.onnx {
        config.models.push(parse_model(raw, ModelKind::Onnx).context("invalid --onnx")?);
    }
    for raw in &source.linear {
        config.models.push(parse_model(raw, ModelKind::Linear).context("invalid --linear")?);
    }
    if source.no_rules {
        config.rules.enabled = false;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceArgs {
        SourceArgs {
            config: None,
            preset: None,
            capture: None,
            attack: None,
            benign: None,
            label_column: None,
            artifacts: None,
            artifacts_sha256: None,
            onnx: Vec::new(),
            linear: Vec::new(),
            no_rules: false,
        }
    }

    #[test]
    fn test_parse_model() {
        let spec = parse_model("gbm=models/gbm.onnx", ModelKind::Onnx).unwrap();
        assert_eq!(spec.name, "gbm");
        assert_eq!(spec.path, PathBuf::from("models/gbm.onnx"));
        assert!(parse_model("gbm", ModelKind::Onnx).is_err());
        assert!(parse_model("=x.onnx", ModelKind::Onnx).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        std::fs::write(
            &path,
            r#"{"dataset": {"attack": "a.csv", "benign": "b.csv"}, "artifacts": "old.json"}"#,
        )
        .unwrap();

        let mut args = source();
        args.config = Some(path);
        args.capture = Some(PathBuf::from("one.csv"));
        args.artifacts = Some(PathBuf::from("new.json"));
        args.linear = vec!["lin=lin.json".into()];
        args.no_rules = true;

        let config = load_config(&args).unwrap();
        assert_eq!(config.dataset.capture, Some(PathBuf::from("one.csv")));
        assert_eq!(config.dataset.attack, None);
        assert_eq!(config.artifacts, Some(PathBuf::from("new.json")));
        assert_eq!(config.models.len(), 1);
        assert!(!config.rules.enabled);
    }

    #[test]
    fn test_preset_is_the_base_for_flags() {
        let mut args = source();
        args.preset = Some(PresetArg::Fast);
        args.capture = Some(PathBuf::from("one.csv"));

        let config = load_config(&args).unwrap();
        assert_eq!(config.pace_ms, 0);
        assert_eq!(config.attack_drop_probability, 0.0);
        assert!(!config.shuffle);
        assert_eq!(config.dataset.capture, Some(PathBuf::from("one.csv")));
    }
}
