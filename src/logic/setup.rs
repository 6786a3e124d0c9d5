//! Startup preconditions
//!
//! Load everything a run needs BEFORE any task starts. Any failure here is
//! a startup error: reported once, nothing is streamed.

use crate::logic::config::{DatasetSource, DemoConfig, ModelKind, ModelSpec};
use crate::logic::dataset::{load_capture, load_labeled_pair, DatasetSummary, LabeledRecord};
use crate::logic::error::DemoResult;
use crate::logic::features::{verify_checksum, FeatureLayout, FittedArtifacts};
use crate::logic::model::{
    check_compatibility, Classifier, LinearClassifier, OnnxClassifier, RuleEngine,
};

/// Everything loaded and checked, ready to stream
pub struct Prepared {
    pub records: Vec<LabeledRecord>,
    pub summary: DatasetSummary,
    pub artifacts: FittedArtifacts,
    pub layout: FeatureLayout,
    pub classifiers: Vec<Box<dyn Classifier>>,
}

pub fn load_dataset(config: &DemoConfig) -> DemoResult<(Vec<LabeledRecord>, DatasetSummary)> {
    let records = match config.dataset.resolve()? {
        DatasetSource::Capture { path, label_column } => load_capture(&path, Some(&label_column))?,
        DatasetSource::Pair { attack, benign } => load_labeled_pair(&attack, &benign)?,
    };

    let summary = DatasetSummary::from_records(&records);
    log::info!("Dataset: {}", summary);
    if !summary.is_labeled() && summary.total > 0 {
        log::info!("Capture has no ground truth; accuracy will not be reported");
    }

    Ok((records, summary))
}

pub fn load_artifacts(config: &DemoConfig) -> DemoResult<FittedArtifacts> {
    let path = config.artifacts.as_deref().ok_or_else(|| {
        crate::logic::config::ConfigError::Invalid("no fitted artifact bundle configured".into())
    })?;

    if let Some(expected) = &config.artifacts_sha256 {
        verify_checksum(path, expected)?;
    }

    let artifacts = FittedArtifacts::load(path)?;
    let layout = artifacts.layout();
    log::info!(
        "Feature layout v{} hash={:#010x} width={}",
        crate::logic::features::FEATURE_VERSION,
        layout.hash(),
        layout.width()
    );
    Ok(artifacts)
}

fn load_model(spec: &ModelSpec) -> DemoResult<Box<dyn Classifier>> {
    if let Some(expected) = &spec.sha256 {
        verify_checksum(&spec.path, expected)?;
    }

    let classifier: Box<dyn Classifier> = match spec.kind {
        ModelKind::Onnx => Box::new(OnnxClassifier::load(&spec.name, &spec.path, spec.input_width)?),
        ModelKind::Linear => Box::new(LinearClassifier::load(&spec.name, &spec.path)?),
    };
    Ok(classifier)
}

/// Fitted models first (in config order), rule engine last
pub fn load_classifiers(config: &DemoConfig, layout: &FeatureLayout) -> DemoResult<Vec<Box<dyn Classifier>>> {
    let mut classifiers = Vec::with_capacity(config.models.len() + 1);

    for spec in &config.models {
        let classifier = load_model(spec)?;
        check_compatibility(classifier.as_ref(), layout)?;
        classifiers.push(classifier);
    }

    if config.rules.enabled {
        classifiers.push(Box::new(RuleEngine::new(config.rules.clone())) as Box<dyn Classifier>);
    }

    log::info!(
        "Classifiers: {}",
        classifiers.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
    );
    Ok(classifiers)
}

/// Run every startup check in order: config, artifacts, models, dataset
pub fn prepare(config: &DemoConfig) -> DemoResult<Prepared> {
    config.validate()?;

    let artifacts = load_artifacts(config)?;
    let layout = artifacts.layout();
    let classifiers = load_classifiers(config, &layout)?;
    let (records, summary) = load_dataset(config)?;

    Ok(Prepared {
        records,
        summary,
        artifacts,
        layout,
        classifiers,
    })
}
