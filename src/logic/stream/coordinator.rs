//! Lifecycle Coordinator
//!
//! Start Replay Source + Control Channel trên thread riêng, chạy Consumer
//! Loop trên thread hiện tại. Mọi đường thoát (xong, interrupt, lỗi, panic)
//! đều set `cancelled` rồi join cả hai task trước khi return.

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use serde::Serialize;

use super::channel::ControlChannel;
use super::consumer::{Consumer, ConsumerReport};
use super::control::ControlState;
use super::pipeline;
use super::replay::{ReplayReport, ReplaySource};
use crate::logic::error::{DemoError, DemoResult};
use crate::logic::features::FeatureExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub replay: ReplayReport,
    pub consumer: ConsumerReport,
    pub elapsed: Duration,
}

/// Sets `cancelled` when dropped, including during unwinding
struct CancelOnDrop<'a>(&'a ControlState);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

pub struct DemoRunner<E, W>
where
    E: FeatureExtractor,
    W: Write,
{
    control: Arc<ControlState>,
    replay: ReplaySource,
    channel: ControlChannel,
    consumer: Consumer<E, W>,
    queue_capacity: usize,
}

impl<E, W> DemoRunner<E, W>
where
    E: FeatureExtractor,
    W: Write,
{
    pub fn new(
        control: Arc<ControlState>,
        replay: ReplaySource,
        channel: ControlChannel,
        consumer: Consumer<E, W>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            control,
            replay,
            channel,
            consumer,
            queue_capacity,
        }
    }

    pub fn run(self) -> DemoResult<RunSummary> {
        let started = Instant::now();
        let DemoRunner {
            control,
            mut replay,
            channel,
            mut consumer,
            queue_capacity,
        } = self;
        let control: &ControlState = &control;

        let (tx, rx) = pipeline::bounded(queue_capacity)?;

        let (consumed, replay_result, channel_result) = thread::scope(|s| {
            let cancel_guard = CancelOnDrop(control);

            let replay_handle = thread::Builder::new()
                .name("replay".into())
                .spawn_scoped(s, move || replay.run(control, tx))
                .map_err(|e| DemoError::Spawn("replay", e))?;

            let channel_handle = match thread::Builder::new()
                .name("control".into())
                .spawn_scoped(s, move || channel.run(control))
            {
                Ok(handle) => handle,
                Err(e) => {
                    control.cancel();
                    drop(rx);
                    let _ = replay_handle.join();
                    return Err(DemoError::Spawn("control", e));
                }
            };
            log::info!("Replay and control tasks started");

            let consumed = consumer.run(rx, control);
            if let Err(e) = &consumed {
                log::error!("Consumer loop failed: {}", e);
            }

            drop(cancel_guard);
            let replay_result = replay_handle.join();
            let channel_result = channel_handle.join();
            log::debug!("Background tasks joined");

            Ok((consumed, replay_result, channel_result))
        })?;

        let consumer_report = consumed?;

        let replay_report = replay_result.map_err(|_| DemoError::TaskPanicked("replay"))?;
        channel_result.map_err(|_| DemoError::TaskPanicked("control"))??;

        let outcome = if control.is_interrupted() {
            RunOutcome::Interrupted
        } else {
            RunOutcome::Completed
        };

        Ok(RunSummary {
            outcome,
            replay: replay_report,
            consumer: consumer_report,
            elapsed: started.elapsed(),
        })
    }
}
