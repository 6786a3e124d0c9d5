//! Control Channel task
//!
//! Đọc key events từ `InputSource`, debounce, rồi ghi vào `ControlState`.
//! Thoát trong vòng một poll tick sau khi `cancelled` bật.

use std::time::Instant;

use super::control::ControlState;
use super::input::{command_for, ControlCommand, Debouncer, InputError, InputSource};

pub struct ControlChannel {
    input: Box<dyn InputSource>,
    debouncer: Debouncer,
}

impl ControlChannel {
    pub fn new(input: Box<dyn InputSource>, debouncer: Debouncer) -> Self {
        Self { input, debouncer }
    }

    /// Task body. An input failure cancels the run before returning.
    pub fn run(mut self, control: &ControlState) -> Result<(), InputError> {
        log::debug!("Control channel started");
        let tick = control.poll_interval();

        while !control.is_cancelled() {
            let input = match self.input.poll(tick) {
                Ok(Some(input)) => input,
                Ok(None) => continue,
                Err(e) => {
                    log::error!("Control channel failed: {}", e);
                    control.cancel();
                    return Err(e);
                }
            };

            if !self.debouncer.accept(input, Instant::now()) {
                continue;
            }

            match command_for(input.key) {
                Some(ControlCommand::TogglePause) => {
                    if control.toggle_pause() {
                        log::info!("Replay paused");
                    } else {
                        log::info!("Replay resumed");
                    }
                }
                Some(ControlCommand::CycleDisplayMode) => {
                    log::info!("Display mode: {}", control.cycle_display_mode());
                }
                Some(ControlCommand::Quit) => {
                    control.request_interrupt();
                }
                None => {}
            }
        }

        log::debug!("Control channel stopped");
        Ok(())
    }
}
