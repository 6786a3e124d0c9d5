//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every tunable can also be overridden through the environment.

/// Delay between two emitted records (simulated real-time)
pub const DEFAULT_PACE_MS: u64 = 100;

/// Tick used for pause polling and cancellation checks
pub const DEFAULT_POLL_MS: u64 = 100;

/// Capacity of the replay -> consumer queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Probability of dropping an attack-labeled row before it is emitted
pub const DEFAULT_ATTACK_DROP_PROBABILITY: f64 = 2.0 / 3.0;

/// Two presses of the same key inside this window count as one
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Keyboard autorepeat delay assumed when the terminal reports no key releases
pub const DEFAULT_REPEAT_DELAY_MS: u64 = 660;

/// Name of the ground-truth column in labeled captures
pub const DEFAULT_LABEL_COLUMN: &str = "Type";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Packet Shield";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Pacing interval from environment or default
pub fn get_pace_ms() -> u64 {
    std::env::var("SHIELD_PACE_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PACE_MS)
}

/// Poll tick from environment or default
pub fn get_poll_ms() -> u64 {
    std::env::var("SHIELD_POLL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_POLL_MS)
}

/// Queue capacity from environment or default
pub fn get_queue_capacity() -> usize {
    std::env::var("SHIELD_QUEUE_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_QUEUE_CAPACITY)
}

/// Attack drop probability from environment or default
pub fn get_attack_drop_probability() -> f64 {
    std::env::var("SHIELD_ATTACK_DROP")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ATTACK_DROP_PROBABILITY)
}

/// Shuffle seed from environment, if any
pub fn get_seed() -> Option<u64> {
    std::env::var("SHIELD_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
}
