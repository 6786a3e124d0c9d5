//! Consumer Loop
//!
//! Pull slot → extract → predict (mỗi predictor) → accuracy → render.
//! Lỗi extract/predict/render KHÔNG bị skip: propagate để coordinator
//! cancel các task còn lại.

use std::io::Write;
use serde::Serialize;

use super::control::ControlState;
use super::display::{Renderer, Verdict};
use super::journal::{Journal, JournalPrediction};
use super::pipeline::{PipelineSlot, SlotReceiver};
use crate::logic::dataset::LabeledRecord;
use crate::logic::error::{DemoError, DemoResult};
use crate::logic::features::FeatureExtractor;
use crate::logic::model::{Classifier, RunningAccuracy, TrafficClass};

struct Predictor {
    classifier: Box<dyn Classifier>,
    accuracy: RunningAccuracy,
}

/// Final per-predictor accuracy
#[derive(Debug, Clone, Serialize)]
pub struct PredictorSummary {
    pub name: String,
    pub accuracy: RunningAccuracy,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsumerReport {
    pub processed: u64,
    pub rendered: u64,
    pub last_sequence_no: Option<u64>,
    pub predictors: Vec<PredictorSummary>,
}

pub struct Consumer<E, W>
where
    E: FeatureExtractor,
    W: Write,
{
    extractor: E,
    predictors: Vec<Predictor>,
    renderer: Renderer<W>,
    journal: Option<Journal>,
}

impl<E, W> Consumer<E, W>
where
    E: FeatureExtractor,
    W: Write,
{
    pub fn new(extractor: E, classifiers: Vec<Box<dyn Classifier>>, renderer: Renderer<W>) -> Self {
        let predictors = classifiers
            .into_iter()
            .map(|classifier| Predictor {
                classifier,
                accuracy: RunningAccuracy::new(),
            })
            .collect();

        Self {
            extractor,
            predictors,
            renderer,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Drain the pipeline until the end-of-stream marker.
    /// Takes the receiver by value: dropping it on exit releases a producer
    /// blocked on a full queue.
    pub fn run(&mut self, rx: SlotReceiver, control: &ControlState) -> DemoResult<ConsumerReport> {
        log::debug!("Consumer loop started ({} predictors)", self.predictors.len());
        let mut report = ConsumerReport::default();

        loop {
            let item = match rx.recv()? {
                PipelineSlot::EndOfStream => break,
                PipelineSlot::Item(item) => item,
            };

            if self.process(&item, control)? {
                report.rendered += 1;
            }
            report.processed += 1;
            report.last_sequence_no = Some(item.record.sequence_no);
        }

        report.predictors = self.summaries();
        log::debug!(
            "Consumer loop finished ({} processed, {} rendered)",
            report.processed, report.rendered
        );
        Ok(report)
    }

    pub fn summaries(&self) -> Vec<PredictorSummary> {
        self.predictors
            .iter()
            .map(|p| PredictorSummary {
                name: p.classifier.name().to_string(),
                accuracy: p.accuracy,
            })
            .collect()
    }

    /// Returns whether the row was rendered
    fn process(&mut self, item: &LabeledRecord, control: &ControlState) -> DemoResult<bool> {
        let features = self.extractor.extract(&item.record)?;

        let mut labels: Vec<TrafficClass> = Vec::with_capacity(self.predictors.len());
        for predictor in &mut self.predictors {
            let label = predictor.classifier.predict(&item.record, &features)?;
            if let Some(truth) = item.label {
                predictor.accuracy.record(label, truth);
            }
            labels.push(label);
        }

        if let Some(journal) = self.journal.as_mut() {
            let predictions = self
                .predictors
                .iter()
                .zip(&labels)
                .map(|(p, &label)| JournalPrediction {
                    predictor: p.classifier.name().to_string(),
                    label,
                })
                .collect();
            let entry = journal.entry(
                item.record.sequence_no,
                item.record.time,
                features.layout_hash,
                predictions,
                item.label,
            );
            journal.append(&entry).map_err(DemoError::Journal)?;
        }

        // Labeled rows were already filtered by the replay source
        let visible = match (item.label, labels.first()) {
            (None, Some(&first)) => control.display_mode().accepts(first),
            _ => true,
        };
        if !visible {
            return Ok(false);
        }

        let verdicts: Vec<Verdict<'_>> = self
            .predictors
            .iter()
            .zip(&labels)
            .map(|(p, &label)| Verdict {
                predictor: p.classifier.name(),
                label,
                accuracy: p.accuracy.accuracy(),
            })
            .collect();
        self.renderer.render(item, &verdicts).map_err(DemoError::Render)?;

        Ok(true)
    }
}
