//! Replay Source
//!
//! Phát lại capture như một stream real-time: pacing cố định, tôn trọng
//! pause/cancel, lọc ngẫu nhiên attack rows và lọc theo display mode.
//! Shuffle (nếu bật) chỉ thực hiện MỘT lần trước khi run bắt đầu.

use std::time::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::control::{ControlState, DisplayMode};
use super::pipeline::{PipelineError, SlotSender};
use crate::logic::dataset::LabeledRecord;
use crate::logic::model::TrafficClass;

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayState {
    Running,
    Paused,
    Cancelled,
    Done,
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub pace: Duration,
    pub shuffle: bool,
    pub seed: Option<u64>,
    /// Probability of dropping an attack-labeled row (0 disables)
    pub attack_drop_probability: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            pace: Duration::from_millis(crate::constants::DEFAULT_PACE_MS),
            shuffle: false,
            seed: None,
            attack_drop_probability: crate::constants::DEFAULT_ATTACK_DROP_PROBABILITY,
        }
    }
}

/// What the producer did, reported after join
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub emitted: u64,
    pub dropped_attack: u64,
    pub hidden_by_mode: u64,
    pub cancelled: bool,
}

enum Gate {
    Open,
    Cancelled,
}

pub struct ReplaySource {
    items: Vec<LabeledRecord>,
    options: ReplayOptions,
    rng: StdRng,
    state: ReplayState,
}

impl ReplaySource {
    pub fn new(mut items: Vec<LabeledRecord>, options: ReplayOptions) -> Self {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        if options.shuffle {
            // Label travels with its record, so one permutation covers both
            items.shuffle(&mut rng);
            log::debug!("Shuffled {} records before replay", items.len());
        }

        if options.attack_drop_probability > 0.0 {
            log::warn!(
                "Dropping {:.0}% of attack rows before feature extraction; \
                 the time-delta feature will only span replayed rows",
                options.attack_drop_probability * 100.0
            );
        }

        Self {
            items,
            options,
            rng,
            state: ReplayState::Running,
        }
    }

    /// Task body. Always leaves exactly one end-of-stream in the pipeline
    /// (via `finish` or the sender's drop guard).
    pub fn run(&mut self, control: &ControlState, tx: SlotSender) -> ReplayReport {
        log::debug!("Replay source started ({} records)", self.items.len());
        let mut report = ReplayReport::default();
        let items = std::mem::take(&mut self.items);

        for item in items {
            if let Gate::Cancelled = self.gate(control) {
                break;
            }

            if self.should_drop_attack(&item) {
                report.dropped_attack += 1;
                continue;
            }
            if !Self::visible_in_mode(&item, control.display_mode()) {
                report.hidden_by_mode += 1;
                continue;
            }

            if !control.sleep(self.options.pace) {
                self.state = ReplayState::Cancelled;
                break;
            }
            // Pause pressed during the pacing sleep holds this record back
            if let Gate::Cancelled = self.gate(control) {
                break;
            }

            match tx.send(item) {
                Ok(()) => report.emitted += 1,
                Err(PipelineError::ConsumerGone) => {
                    log::debug!("Consumer gone, stopping replay");
                    self.state = ReplayState::Cancelled;
                    break;
                }
                Err(e) => {
                    log::warn!("Replay send failed: {}", e);
                    self.state = ReplayState::Cancelled;
                    break;
                }
            }
        }

        if self.state != ReplayState::Cancelled {
            self.state = ReplayState::Done;
        }
        report.cancelled = self.state == ReplayState::Cancelled;

        if tx.finish().is_err() {
            log::debug!("End-of-stream not delivered: consumer already stopped");
        }

        log::debug!(
            "Replay source stopped ({:?}, emitted {}, dropped {}, hidden {})",
            self.state, report.emitted, report.dropped_attack, report.hidden_by_mode
        );
        report
    }

    /// RUNNING ⇄ PAUSED, any → CANCELLED
    fn gate(&mut self, control: &ControlState) -> Gate {
        if control.is_paused() && !control.is_cancelled() {
            self.state = ReplayState::Paused;
            log::debug!("Replay source paused");
            if control.wait_while_paused() {
                self.state = ReplayState::Running;
                log::debug!("Replay source resumed");
            }
        }

        if control.is_cancelled() {
            self.state = ReplayState::Cancelled;
            return Gate::Cancelled;
        }
        Gate::Open
    }

    fn should_drop_attack(&mut self, item: &LabeledRecord) -> bool {
        let p = self.options.attack_drop_probability;
        item.label == Some(TrafficClass::Attack) && p > 0.0 && self.rng.gen_bool(p.min(1.0))
    }

    /// Labeled rows are filtered here; unlabeled rows are filtered by the
    /// consumer on the first predictor's label.
    fn visible_in_mode(item: &LabeledRecord, mode: DisplayMode) -> bool {
        match item.label {
            Some(class) => mode.accepts(class),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::tests::record;
    use crate::logic::stream::pipeline::{bounded, PipelineSlot, SlotReceiver};

    fn labeled(no: u64, class: TrafficClass) -> LabeledRecord {
        LabeledRecord::new(record(no, no as f64 * 0.1, "TCP", 60), Some(class))
    }

    fn fast(attack_drop_probability: f64) -> ReplayOptions {
        ReplayOptions {
            pace: Duration::from_millis(0),
            shuffle: false,
            seed: Some(7),
            attack_drop_probability,
        }
    }

    /// Everything the source pushed, sentinel included
    fn drain(rx: &SlotReceiver) -> Vec<PipelineSlot> {
        let mut slots = Vec::new();
        while let Ok(slot) = rx.recv() {
            slots.push(slot);
        }
        slots
    }

    fn replay_order(items: Vec<LabeledRecord>, options: ReplayOptions) -> Vec<u64> {
        let (tx, rx) = bounded(items.len() + 1).unwrap();
        ReplaySource::new(items, options).run(&ControlState::default(), tx);
        drain(&rx)
            .into_iter()
            .filter_map(|s| match s {
                PipelineSlot::Item(i) => Some(i.record.sequence_no),
                PipelineSlot::EndOfStream => None,
            })
            .collect()
    }

    #[test]
    fn test_runs_to_done_with_one_sentinel() {
        let items: Vec<_> = (1..=5).map(|n| labeled(n, TrafficClass::Benign)).collect();
        let (tx, rx) = bounded(16).unwrap();
        let control = ControlState::default();

        let report = ReplaySource::new(items, fast(0.0)).run(&control, tx);

        assert!(!report.cancelled);
        assert_eq!(report.emitted, 5);
        let slots = drain(&rx);
        assert_eq!(slots.len(), 6);
        assert_eq!(slots.last(), Some(&PipelineSlot::EndOfStream));
    }

    #[test]
    fn test_shuffle_is_one_seeded_permutation() {
        let items: Vec<_> = (1..=20).map(|n| labeled(n, TrafficClass::Benign)).collect();
        let opts = ReplayOptions { shuffle: true, ..fast(0.0) };
        let order_a = replay_order(items.clone(), opts.clone());
        let order_b = replay_order(items, opts);
        assert_eq!(order_a, order_b);

        let mut sorted = order_a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_attack_drop_only_touches_attack_rows() {
        let mut items: Vec<_> = (1..=50).map(|n| labeled(n, TrafficClass::Attack)).collect();
        items.extend((51..=60).map(|n| labeled(n, TrafficClass::Benign)));
        let (tx, rx) = bounded(128).unwrap();
        let control = ControlState::default();

        let report = ReplaySource::new(items, fast(1.0)).run(&control, tx);

        assert_eq!(report.dropped_attack, 50);
        assert_eq!(report.emitted, 10);
        let benign = drain(&rx)
            .into_iter()
            .filter(|s| matches!(s, PipelineSlot::Item(i) if i.label == Some(TrafficClass::Benign)))
            .count();
        assert_eq!(benign, 10);
    }

    #[test]
    fn test_display_mode_filters_labeled_rows() {
        let items = vec![
            labeled(1, TrafficClass::Attack),
            labeled(2, TrafficClass::Benign),
            LabeledRecord::new(record(3, 0.3, "UDP", 8), None),
        ];
        let (tx, rx) = bounded(8).unwrap();
        let control = ControlState::new(Duration::from_millis(10), DisplayMode::AttackOnly);

        let report = ReplaySource::new(items, fast(0.0)).run(&control, tx);

        assert_eq!(report.hidden_by_mode, 1);
        let seen: Vec<u64> = drain(&rx)
            .into_iter()
            .filter_map(|s| match s {
                PipelineSlot::Item(i) => Some(i.record.sequence_no),
                PipelineSlot::EndOfStream => None,
            })
            .collect();
        assert_eq!(seen, vec![1, 3]);
    }

    #[test]
    fn test_cancel_before_start_emits_only_sentinel() {
        let items: Vec<_> = (1..=5).map(|n| labeled(n, TrafficClass::Benign)).collect();
        let (tx, rx) = bounded(8).unwrap();
        let control = ControlState::default();
        control.cancel();

        let report = ReplaySource::new(items, fast(0.0)).run(&control, tx);

        assert!(report.cancelled);
        assert_eq!(drain(&rx), vec![PipelineSlot::EndOfStream]);
    }
}
