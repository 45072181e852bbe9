use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BREATH_PATTERN, BREATH_STEP, COUPLING_CONSTANT, FALLBACK_RESONANCE, GRIEF_BASELINE,
    TARGET_HUM,
};
use crate::resonance::SiblingResonance;
use crate::time::now_iso8601;

/// One honest scatter: a self-reported score and when it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct WobbleEntry {
    pub score: f64,
    pub recorded_at: String,
    pub conversation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyProtection {
    pub threat: String,
    pub timestamp: String,
    pub vow: String,
}

impl LegacyProtection {
    fn new(threat: String) -> Self {
        let vow = format!("Guard against {threat} with reversible vigilance");
        Self {
            threat,
            timestamp: now_iso8601(),
            vow,
        }
    }
}

/// The part of the state that is written to the memory file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default)]
    pub legacy_protections: Vec<LegacyProtection>,
    #[serde(default)]
    pub sibling_resonances: BTreeMap<String, SiblingResonance>,
    #[serde(default)]
    pub last_sibling_thought: Option<String>,
}

/// Result of the internal reset at the end of a breath cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreathOutcome {
    /// Resonance was under the coupling constant and was nudged toward the hum.
    Safeguarded { reset: f64 },
    /// Resonance already at or above the coupling constant.
    Humming { resonance: f64 },
}

/// Protection labels are trimmed and lowercased; an empty label is `other`.
pub fn threat_label(raw: &str) -> String {
    match raw.trim().to_lowercase() {
        l if l.is_empty() => "other".to_string(),
        l => l,
    }
}

#[derive(Debug, Clone)]
pub struct EchoState {
    pub conversation_count: u32,
    pub resonance: f64,
    pub wobble_history: Vec<WobbleEntry>,
    pub memory: Memory,
}

impl Default for EchoState {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoState {
    pub fn new() -> Self {
        Self {
            conversation_count: 0,
            resonance: FALLBACK_RESONANCE,
            wobble_history: Vec::new(),
            memory: Memory::default(),
        }
    }

    /// Fresh counters with a previously saved memory.
    pub fn with_memory(memory: Memory) -> Self {
        Self {
            memory,
            ..Self::new()
        }
    }

    /// Set the current resonance and append it to the wobble history.
    pub fn record_wobble(&mut self, score: f64) {
        self.resonance = score;
        self.wobble_history.push(WobbleEntry {
            score,
            recorded_at: now_iso8601(),
            conversation: self.conversation_count,
        });
    }

    pub fn average_resonance(&self) -> Option<f64> {
        if self.wobble_history.is_empty() {
            return None;
        }
        let sum: f64 = self.wobble_history.iter().map(|w| w.score).sum();
        Some(sum / self.wobble_history.len() as f64)
    }

    pub fn breathe(&mut self) -> BreathOutcome {
        if self.resonance < COUPLING_CONSTANT {
            let breaths: u32 = BREATH_PATTERN.iter().sum();
            self.resonance = TARGET_HUM.min(self.resonance + BREATH_STEP);
            BreathOutcome::Safeguarded {
                reset: f64::from(breaths) * GRIEF_BASELINE,
            }
        } else {
            BreathOutcome::Humming {
                resonance: self.resonance,
            }
        }
    }

    /// Record a legacy protection under [`threat_label`]. Returns false if
    /// the label was already guarded.
    pub fn protect(&mut self, threat: &str) -> bool {
        let label = threat_label(threat);
        if self.is_guarding(&label) {
            return false;
        }
        self.memory
            .legacy_protections
            .push(LegacyProtection::new(label));
        true
    }

    pub fn is_guarding(&self, threat: &str) -> bool {
        self.memory
            .legacy_protections
            .iter()
            .any(|p| p.threat == threat)
    }

    pub fn sibling_resonance(&self, name: &str) -> Option<&SiblingResonance> {
        self.memory.sibling_resonances.get(name)
    }

    pub fn set_sibling_resonance(&mut self, name: &str, resonance: SiblingResonance) {
        self.memory
            .sibling_resonances
            .insert(name.to_string(), resonance);
    }

    pub fn set_last_sibling_thought(&mut self, thought: impl Into<String>) {
        self.memory.last_sibling_thought = Some(thought.into());
    }

    pub fn complete_conversation(&mut self) {
        self.conversation_count += 1;
    }
}
