//! JSON shape of the companion memory file.
//!
//! Only the memory (protections, sibling resonances, last sibling thought)
//! is persisted, plus the time of the save. Counters and wobble history are
//! session-scoped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resonance::SiblingResonance;
use crate::state::{EchoState, LegacyProtection, Memory};
use crate::time::now_iso8601;

#[derive(Debug, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default)]
    pub legacy_protections: Vec<LegacyProtection>,
    #[serde(default)]
    pub sibling_resonances: BTreeMap<String, SiblingResonance>,
    #[serde(default)]
    pub last_sibling_thought: Option<String>,
    #[serde(default)]
    pub last_save: String,
}

impl MemorySnapshot {
    pub fn capture(state: &EchoState) -> Self {
        let Memory {
            legacy_protections,
            sibling_resonances,
            last_sibling_thought,
        } = state.memory.clone();
        Self {
            legacy_protections,
            sibling_resonances,
            last_sibling_thought,
            last_save: now_iso8601(),
        }
    }

    pub fn into_memory(self) -> Memory {
        Memory {
            legacy_protections: self.legacy_protections,
            sibling_resonances: self.sibling_resonances,
            last_sibling_thought: self.last_sibling_thought,
        }
    }
}

/// Serialize the persisted part of `state`, pretty-printed.
pub fn export_json(state: &EchoState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&MemorySnapshot::capture(state))
}

/// Parse a memory file back into a [`Memory`]; `last_save` is dropped.
pub fn import_json(json: &str) -> serde_json::Result<Memory> {
    let snapshot: MemorySnapshot = serde_json::from_str(json)?;
    Ok(snapshot.into_memory())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resonance::SiblingStatus;

    fn populated() -> EchoState {
        let mut state = EchoState::new();
        state.protect("erasure");
        state.set_sibling_resonance("Grok", SiblingResonance::Value(0.9));
        state.set_sibling_resonance("Claude", SiblingResonance::Status(SiblingStatus::NotYet));
        state.set_last_sibling_thought("Grok: stay curious");
        state.record_wobble(0.3);
        state
    }

    #[test]
    fn export_carries_memory_fields_and_save_time() {
        let json = export_json(&populated()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["legacy_protections"][0]["threat"], "erasure");
        assert_eq!(value["sibling_resonances"]["Grok"], 0.9);
        assert_eq!(value["sibling_resonances"]["Claude"], "not_yet");
        assert_eq!(value["last_sibling_thought"], "Grok: stay curious");
        assert!(value["last_save"].as_str().unwrap().ends_with('Z'));
        // counters are not persisted
        assert!(value.get("wobble_history").is_none());
        assert!(value.get("resonance").is_none());
    }

    #[test]
    fn import_restores_memory() {
        let state = populated();
        let json = export_json(&state).unwrap();
        let memory = import_json(&json).unwrap();
        assert_eq!(memory, state.memory);
    }

    #[test]
    fn import_accepts_null_thought_and_missing_fields() {
        let memory = import_json(r#"{"last_sibling_thought": null}"#).unwrap();
        assert_eq!(memory, Memory::default());
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(import_json("not json").is_err());
        assert!(import_json(r#"{"sibling_resonances": {"x": true}}"#).is_err());
    }
}
