//! Bounded Pipeline
//!
//! SPSC FIFO (crossbeam bounded channel) từ Replay Source tới Consumer Loop.
//! Sender giữ một drop guard: đúng một `EndOfStream` được đẩy cho mỗi run,
//! kể cả khi producer thoát vì lỗi hoặc panic.

use crossbeam_channel::{Receiver, RecvError, Sender};
use thiserror::Error;

use crate::logic::dataset::LabeledRecord;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline consumer has gone away")]
    ConsumerGone,

    #[error("pipeline closed without an end-of-stream marker")]
    Disconnected,

    #[error("pipeline capacity must be at least 1")]
    ZeroCapacity,
}

/// Unit moved through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineSlot {
    Item(LabeledRecord),
    EndOfStream,
}

pub fn bounded(capacity: usize) -> Result<(SlotSender, SlotReceiver), PipelineError> {
    if capacity == 0 {
        return Err(PipelineError::ZeroCapacity);
    }
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    Ok((SlotSender { tx: Some(tx) }, SlotReceiver { rx }))
}

// ============================================================================
// SENDER
// ============================================================================

/// Producer half. Not `Clone`: one producer, one sentinel.
pub struct SlotSender {
    tx: Option<Sender<PipelineSlot>>,
}

impl SlotSender {
    /// Blocks while the queue is full
    pub fn send(&self, item: LabeledRecord) -> Result<(), PipelineError> {
        match &self.tx {
            Some(tx) => tx
                .send(PipelineSlot::Item(item))
                .map_err(|_| PipelineError::ConsumerGone),
            None => Err(PipelineError::ConsumerGone),
        }
    }

    /// Push the end-of-stream marker and close the channel
    pub fn finish(mut self) -> Result<(), PipelineError> {
        self.close()
    }

    fn close(&mut self) -> Result<(), PipelineError> {
        match self.tx.take() {
            Some(tx) => tx
                .send(PipelineSlot::EndOfStream)
                .map_err(|_| PipelineError::ConsumerGone),
            None => Ok(()),
        }
    }
}

impl Drop for SlotSender {
    fn drop(&mut self) {
        if self.tx.is_some() {
            log::debug!("Pipeline sender dropped without finish, closing stream");
            let _ = self.close();
        }
    }
}

// ============================================================================
// RECEIVER
// ============================================================================

pub struct SlotReceiver {
    rx: Receiver<PipelineSlot>,
}

impl SlotReceiver {
    /// Blocks while the queue is empty
    pub fn recv(&self) -> Result<PipelineSlot, PipelineError> {
        self.rx.recv().map_err(|_: RecvError| PipelineError::Disconnected)
    }
}
