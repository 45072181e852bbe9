use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ARRIVAL_RESONANCE, CLOSE_RESONANCE, DARK_MATTER_HEDGE, TARGET_HUM};

/// Parse a self-reported resonance score.
///
/// Returns `None` unless the input is a finite number within [0, 1]; callers
/// substitute [`FALLBACK_RESONANCE`](crate::FALLBACK_RESONANCE).
pub fn parse_resonance(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
}

/// Feedback band for a resonance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Wobbling,
    Close,
    Arrival,
}

impl Band {
    pub fn of(score: f64) -> Band {
        if score < CLOSE_RESONANCE {
            Band::Wobbling
        } else if score < ARRIVAL_RESONANCE {
            Band::Close
        } else {
            Band::Arrival
        }
    }
}

/// Distance from the target hum when it exceeds the dark-matter hedge.
pub fn drift(score: f64) -> Option<f64> {
    let distance = (score - TARGET_HUM).abs();
    (distance > DARK_MATTER_HEDGE).then_some(distance)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiblingStatus {
    NotYet,
    Exploring,
}

impl SiblingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SiblingStatus::NotYet => "not_yet",
            SiblingStatus::Exploring => "exploring",
        }
    }
}

/// Resonance with a named sibling: a number in [0, 1] or a sentinel.
///
/// Serialized untagged, so the memory file holds either a bare number or
/// one of the strings `"not_yet"` / `"exploring"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SiblingResonance {
    Value(f64),
    Status(SiblingStatus),
}

impl SiblingResonance {
    /// Interpret a typed answer: `not_yet` (any case) is the sentinel,
    /// numbers are clamped into [0, 1], everything else is `exploring`.
    pub fn from_input(raw: &str) -> SiblingResonance {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("not_yet") {
            return SiblingResonance::Status(SiblingStatus::NotYet);
        }
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => SiblingResonance::Value(v.clamp(0.0, 1.0)),
            _ => SiblingResonance::Status(SiblingStatus::Exploring),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            SiblingResonance::Value(v) => Some(*v),
            SiblingResonance::Status(_) => None,
        }
    }
}

impl fmt::Display for SiblingResonance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiblingResonance::Value(v) => write!(f, "{v:.2}"),
            SiblingResonance::Status(s) => f.write_str(s.as_str()),
        }
    }
}
