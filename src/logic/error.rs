//! Error handling

use std::io;
use thiserror::Error;

use crate::logic::config::ConfigError;
use crate::logic::dataset::DatasetError;
use crate::logic::features::{ArtifactError, ExtractError};
use crate::logic::model::ClassifierError;
use crate::logic::stream::{InputError, PipelineError};

pub type DemoResult<T> = Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    // Startup errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Input(#[from] InputError),

    // Per-record errors
    #[error("feature extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("cannot write output: {0}")]
    Render(#[source] io::Error),

    #[error("cannot write run journal: {0}")]
    Journal(#[source] io::Error),

    // Background tasks
    #[error("cannot start {0} task: {1}")]
    Spawn(&'static str, #[source] io::Error),

    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}
