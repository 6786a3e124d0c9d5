//! Operator Input
//!
//! `InputSource` là capability inject được: terminal thật (crossterm),
//! NullInput cho chạy không tương tác, script cho test.

use std::collections::HashSet;
use std::io::{self, IsTerminal};
use std::thread;
use std::time::{Duration, Instant};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::terminal;
use thiserror::Error;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InputError {
    #[error("keyboard control needs an interactive terminal (run from a TTY, or pass --no-input)")]
    NotInteractive,

    #[error("terminal input failed: {0}")]
    Terminal(#[from] io::Error),
}

// ============================================================================
// KEY EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Tab,
    Esc,
    CtrlC,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub kind: KeyKind,
}

#[cfg(test)]
impl KeyInput {
    pub fn press(key: Key) -> Self {
        Self { key, kind: KeyKind::Press }
    }

    pub fn release(key: Key) -> Self {
        Self { key, kind: KeyKind::Release }
    }
}

/// Semantic command mapped from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    TogglePause,
    CycleDisplayMode,
    Quit,
}

/// Keymap: space/p → pause, m/Tab → display mode, q/Esc/Ctrl+C → quit
pub fn command_for(key: Key) -> Option<ControlCommand> {
    match key {
        Key::Space | Key::Char('p') | Key::Char('P') => Some(ControlCommand::TogglePause),
        Key::Tab | Key::Char('m') | Key::Char('M') => Some(ControlCommand::CycleDisplayMode),
        Key::Esc | Key::CtrlC | Key::Char('q') | Key::Char('Q') => Some(ControlCommand::Quit),
        _ => None,
    }
}

// ============================================================================
// DEBOUNCER
// ============================================================================

/// One physical press → one accepted event.
///
/// Repeats are always ignored. Held keys are only tracked once the terminal
/// has reported a release, since most terminals never do. Until then a held
/// key shows up as a stream of presses: the first one after the terminal's
/// autorepeat delay, then one every few tens of milliseconds. Same-key
/// presses inside `max(window, repeat_delay)` of the previous one are
/// treated as that stream and push the deadline forward.
pub struct Debouncer {
    window: Duration,
    repeat_delay: Duration,
    last: Option<(Key, Instant)>,
    held: HashSet<Key>,
    release_seen: bool,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            repeat_delay: window,
            last: None,
            held: HashSet::new(),
            release_seen: false,
        }
    }

    /// Autorepeat delay assumed while the terminal reports no releases
    pub fn with_repeat_delay(mut self, repeat_delay: Duration) -> Self {
        self.repeat_delay = repeat_delay;
        self
    }

    pub fn accept(&mut self, input: KeyInput, now: Instant) -> bool {
        match input.kind {
            KeyKind::Repeat => false,
            KeyKind::Release => {
                self.release_seen = true;
                self.held.remove(&input.key);
                false
            }
            KeyKind::Press if self.release_seen => {
                if !self.held.insert(input.key) {
                    return false;
                }
                if let Some((key, at)) = self.last {
                    if key == input.key && now.saturating_duration_since(at) < self.window {
                        return false;
                    }
                }
                self.last = Some((input.key, now));
                true
            }
            KeyKind::Press => {
                let hold = self.window.max(self.repeat_delay);
                if let Some((key, at)) = self.last.as_mut() {
                    if *key == input.key && now.saturating_duration_since(*at) < hold {
                        *at = now;
                        return false;
                    }
                }
                self.last = Some((input.key, now));
                true
            }
        }
    }
}

// ============================================================================
// INPUT SOURCES
// ============================================================================

pub trait InputSource: Send {
    /// Wait up to `timeout` for the next key event
    fn poll(&mut self, timeout: Duration) -> Result<Option<KeyInput>, InputError>;
}

/// Raw-mode terminal keyboard.
/// Raw mode is restored when this is dropped.
pub struct TerminalInput {
    enhanced: bool,
}

impl TerminalInput {
    /// Startup precondition: stdin must be an interactive terminal
    pub fn acquire() -> Result<Self, InputError> {
        if !io::stdin().is_terminal() {
            return Err(InputError::NotInteractive);
        }

        terminal::enable_raw_mode()?;

        // Release events let the debouncer ignore held keys
        let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
            && crossterm::execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();

        log::debug!("Terminal input acquired (release events: {})", enhanced);
        Ok(Self { enhanced })
    }

    fn convert(event: KeyEvent) -> KeyInput {
        let key = match event.code {
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::CtrlC,
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Tab => Key::Tab,
            KeyCode::Esc => Key::Esc,
            _ => Key::Other,
        };
        let kind = match event.kind {
            KeyEventKind::Press => KeyKind::Press,
            KeyEventKind::Repeat => KeyKind::Repeat,
            KeyEventKind::Release => KeyKind::Release,
        };
        KeyInput { key, kind }
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self, timeout: Duration) -> Result<Option<KeyInput>, InputError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(Some(Self::convert(key))),
            _ => Ok(None),
        }
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = crossterm::execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// No keyboard: only cancellation (or a ctrlc handler) ends the run early
pub struct NullInput;

impl InputSource for NullInput {
    fn poll(&mut self, timeout: Duration) -> Result<Option<KeyInput>, InputError> {
        thread::sleep(timeout);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap() {
        assert_eq!(command_for(Key::Space), Some(ControlCommand::TogglePause));
        assert_eq!(command_for(Key::Char('p')), Some(ControlCommand::TogglePause));
        assert_eq!(command_for(Key::Tab), Some(ControlCommand::CycleDisplayMode));
        assert_eq!(command_for(Key::Char('m')), Some(ControlCommand::CycleDisplayMode));
        assert_eq!(command_for(Key::CtrlC), Some(ControlCommand::Quit));
        assert_eq!(command_for(Key::Char('x')), None);
        assert_eq!(command_for(Key::Other), None);
    }

    #[test]
    fn test_debounce_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0));
        assert!(!debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_millis(50)));
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_millis(300)));
        // A different key is not debounced against the last one
        assert!(debouncer.accept(KeyInput::press(Key::Tab), t0 + Duration::from_millis(310)));
    }

    #[test]
    fn test_autorepeat_stream_is_one_press() {
        let mut debouncer = Debouncer::new(Duration::from_millis(200))
            .with_repeat_delay(Duration::from_millis(660));
        let t0 = Instant::now();
        let mut accepted = usize::from(debouncer.accept(KeyInput::press(Key::Space), t0));
        // Held key on a terminal without release events: autorepeat starts
        // after 500 ms and continues every 30 ms for a second
        for ms in (500..=1500).step_by(30) {
            if debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_millis(ms)) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);

        // The stream keeps the deadline moving; a fresh press after it ends counts
        assert!(!debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_millis(2100)));
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_millis(2900)));
    }

    #[test]
    fn test_release_events_switch_to_hold_tracking() {
        let mut debouncer = Debouncer::new(Duration::from_millis(50))
            .with_repeat_delay(Duration::from_millis(660));
        let t0 = Instant::now();
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0));
        assert!(!debouncer.accept(KeyInput::release(Key::Space), t0 + Duration::from_millis(80)));
        // With releases reported, a quick second tap is a real press
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_millis(150)));
    }

    #[test]
    fn test_repeat_is_ignored() {
        let mut debouncer = Debouncer::new(Duration::from_millis(200));
        let t0 = Instant::now();
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0));
        let repeat = KeyInput { key: Key::Space, kind: KeyKind::Repeat };
        assert!(!debouncer.accept(repeat, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_held_key_after_release_tracking() {
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        let t0 = Instant::now();
        assert!(!debouncer.accept(KeyInput::release(Key::Tab), t0));
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0));
        // Still held: a second press without release is ignored
        assert!(!debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_secs(1)));
        assert!(!debouncer.accept(KeyInput::release(Key::Space), t0 + Duration::from_secs(1)));
        assert!(debouncer.accept(KeyInput::press(Key::Space), t0 + Duration::from_secs(2)));
    }
}
