//! Rule-Based Predictor
//!
//! Burst traffic + suspicious packet length → attack.
//! Có `last_time` riêng, tách biệt với `previous_time` của feature extractor:
//! rule engine xét burst window, không phải time-delta feature của model.

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError};
use super::types::TrafficClass;
use crate::logic::dataset::Record;
use crate::logic::features::FeatureVector;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Inter-arrival below this (seconds) is a burst
pub const BURST_THRESHOLD_SECS: f64 = 0.00125;

/// Packet lengths seen in the attack captures
pub const SUSPICIOUS_LENGTHS: [u32; 2] = [8, 32];

/// Rule thresholds (configurable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub enabled: bool,
    pub burst_threshold_secs: f64,
    pub suspicious_lengths: Vec<u32>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            burst_threshold_secs: BURST_THRESHOLD_SECS,
            suspicious_lengths: SUSPICIOUS_LENGTHS.to_vec(),
        }
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

pub struct RuleEngine {
    config: RuleConfig,
    last_time: f64,
}

impl RuleEngine {
    pub fn new(config: RuleConfig) -> Self {
        Self { config, last_time: 0.0 }
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// Evaluate one packet and remember its timestamp
    pub fn evaluate(&mut self, record: &Record) -> TrafficClass {
        let time_diff = record.time - self.last_time;
        self.last_time = record.time;

        let is_burst = time_diff < self.config.burst_threshold_secs;
        let suspicious_length = self.config.suspicious_lengths.contains(&record.length);

        if is_burst && suspicious_length {
            TrafficClass::Attack
        } else {
            TrafficClass::Benign
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RuleConfig::default())
    }
}

impl Classifier for RuleEngine {
    fn name(&self) -> &str {
        "rules"
    }

    fn predict(&mut self, record: &Record, _features: &FeatureVector) -> Result<TrafficClass, ClassifierError> {
        Ok(self.evaluate(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::tests::record;

    #[test]
    fn test_burst_with_suspicious_length_is_attack() {
        let mut rules = RuleEngine::default();
        assert_eq!(rules.evaluate(&record(1, 1.0, "UDP", 32)), TrafficClass::Benign);
        assert_eq!(rules.evaluate(&record(2, 1.0005, "UDP", 32)), TrafficClass::Attack);
        assert_eq!(rules.last_time(), 1.0005);
    }

    #[test]
    fn test_burst_alone_is_benign() {
        let mut rules = RuleEngine::default();
        rules.evaluate(&record(1, 1.0, "TCP", 60));
        assert_eq!(rules.evaluate(&record(2, 1.0001, "TCP", 60)), TrafficClass::Benign);
    }

    #[test]
    fn test_slow_suspicious_length_is_benign() {
        let mut rules = RuleEngine::default();
        rules.evaluate(&record(1, 1.0, "UDP", 8));
        assert_eq!(rules.evaluate(&record(2, 2.0, "UDP", 8)), TrafficClass::Benign);
    }

    #[test]
    fn test_first_packet_measures_from_zero() {
        let mut rules = RuleEngine::default();
        // 0.001 - 0.0 < 0.00125 → burst on the very first packet
        assert_eq!(rules.evaluate(&record(1, 0.001, "UDP", 8)), TrafficClass::Attack);
    }
}
