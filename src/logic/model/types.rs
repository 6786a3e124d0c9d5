//! Model Types
//!
//! Core types shared by every predictor.
//! KHÔNG chứa logic - chỉ data structures.

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

// ============================================================================
// TRAFFIC CLASSIFICATION
// ============================================================================

/// Binary traffic label (0 = benign, 1 = attack)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficClass {
    Benign,
    Attack,
}

impl TrafficClass {
    /// Map a numeric label column value
    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(TrafficClass::Benign),
            1 => Some(TrafficClass::Attack),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficClass::Benign => "benign",
            TrafficClass::Attack => "attack",
        }
    }

    /// Label shown to the operator
    pub fn display_name(&self) -> &'static str {
        match self {
            TrafficClass::Benign => "BENIGN",
            TrafficClass::Attack => "ATTACK",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            TrafficClass::Benign => Color::Green,
            TrafficClass::Attack => Color::Red,
        }
    }
}

impl std::fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(TrafficClass::from_label(0), Some(TrafficClass::Benign));
        assert_eq!(TrafficClass::from_label(1), Some(TrafficClass::Attack));
        assert_eq!(TrafficClass::from_label(2), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&TrafficClass::Attack).unwrap();
        assert_eq!(json, "\"attack\"");
    }
}
