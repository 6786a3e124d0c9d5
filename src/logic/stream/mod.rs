//! Stream Module - Real-time Replay Engine
//!
//! Replay Source → Bounded Pipeline → Consumer Loop, điều khiển bởi
//! Control Channel qua `ControlState`. Coordinator sở hữu lifecycle.

pub mod control;
pub mod input;
pub mod channel;
pub mod pipeline;
pub mod replay;
pub mod consumer;
pub mod display;
pub mod journal;
pub mod coordinator;


// Re-export common types
pub use channel::ControlChannel;
pub use consumer::Consumer;
pub use control::{ControlState, DisplayMode};
pub use coordinator::{DemoRunner, RunOutcome, RunSummary};
pub use display::{RenderStyle, Renderer};
pub use input::{Debouncer, InputError, InputSource, NullInput, TerminalInput};
pub use journal::Journal;
pub use pipeline::PipelineError;
pub use replay::{ReplayOptions, ReplaySource};
