//! Control State
//!
//! Shared flags giữa Replay Source, Control Channel và Consumer Loop.
//! Mọi field là atomic; Mutex + Condvar chỉ dùng để đánh thức các task
//! đang sleep/pause khi có cancel hoặc resume.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::{Duration, Instant};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::logic::model::TrafficClass;

// ============================================================================
// DISPLAY MODE
// ============================================================================

/// Operator-selectable filter over rendered classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    All,
    AttackOnly,
    BenignOnly,
}

impl DisplayMode {
    /// Next mode in the cycle (wraps)
    pub fn next(self) -> Self {
        match self {
            DisplayMode::All => DisplayMode::AttackOnly,
            DisplayMode::AttackOnly => DisplayMode::BenignOnly,
            DisplayMode::BenignOnly => DisplayMode::All,
        }
    }

    pub fn accepts(self, class: TrafficClass) -> bool {
        match self {
            DisplayMode::All => true,
            DisplayMode::AttackOnly => class == TrafficClass::Attack,
            DisplayMode::BenignOnly => class == TrafficClass::Benign,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::All => "all",
            DisplayMode::AttackOnly => "attack-only",
            DisplayMode::BenignOnly => "benign-only",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            DisplayMode::All => 0,
            DisplayMode::AttackOnly => 1,
            DisplayMode::BenignOnly => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => DisplayMode::AttackOnly,
            2 => DisplayMode::BenignOnly,
            _ => DisplayMode::All,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONTROL STATE
// ============================================================================

pub struct ControlState {
    cancelled: AtomicBool,
    interrupted: AtomicBool,
    paused: AtomicBool,
    display_mode: AtomicU8,
    poll_interval: Duration,
    lock: Mutex<()>,
    wake: Condvar,
}

impl ControlState {
    pub fn new(poll_interval: Duration, display_mode: DisplayMode) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            interrupted: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            display_mode: AtomicU8::new(display_mode.to_u8()),
            poll_interval,
            lock: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    // === Cancellation (monotonic) ===

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cancellation. Returns true only for the first caller.
    pub fn cancel(&self) -> bool {
        let first = !self.cancelled.swap(true, Ordering::SeqCst);
        if first {
            log::debug!("Cancellation requested");
        }
        self.notify();
        first
    }

    /// Operator-requested stop: cancels and marks the run as interrupted
    pub fn request_interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        if self.cancel() {
            log::info!("Interrupt requested by operator");
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    // === Pause ===

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Flip pause; returns the new value
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.paused.fetch_xor(true, Ordering::SeqCst);
        self.notify();
        paused
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
        self.notify();
    }

    // === Display mode ===

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_u8(self.display_mode.load(Ordering::SeqCst))
    }

    /// Advance to the next mode; returns the new mode
    pub fn cycle_display_mode(&self) -> DisplayMode {
        let previous = self
            .display_mode
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                Some(DisplayMode::from_u8(v).next().to_u8())
            })
            .unwrap_or_else(|v| v);
        DisplayMode::from_u8(previous).next()
    }

    // === Blocking helpers ===

    /// Sleep up to `duration`, waking early on cancellation.
    /// Returns false if the run was cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.lock.lock();
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let wait = (deadline - now).min(self.poll_interval);
            self.wake.wait_for(&mut guard, wait);
        }
    }

    /// Block while paused. Returns false if the run was cancelled.
    pub fn wait_while_paused(&self) -> bool {
        let mut guard = self.lock.lock();
        while self.is_paused() && !self.is_cancelled() {
            self.wake.wait_for(&mut guard, self.poll_interval);
        }
        !self.is_cancelled()
    }

    fn notify(&self) {
        // Taking the lock orders the flag write before any waiter's re-check
        let _guard = self.lock.lock();
        self.wake.notify_all();
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(crate::constants::DEFAULT_POLL_MS),
            DisplayMode::All,
        )
    }
}
