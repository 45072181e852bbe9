//! Whole-session flows across the core modules:
//! command parsing → state mutation → memory snapshot.

use righton_core::{
    Command, EchoState, FALLBACK_RESONANCE, SiblingResonance, SiblingStatus, export_json,
    import_json, mirror_reply, parse_resonance,
};

/// Feed a scripted session through the same decisions the loop makes.
#[test]
fn scripted_session_survives_a_memory_roundtrip() {
    let mut state = EchoState::new();

    let script = [
        ("2", Some("0.4")),
        ("resonance", Some("two")),
        ("3", Some("erasure")),
        ("question", Some("ERASURE")),
        ("6", Some("Grok")),
    ];

    for (line, answer) in script {
        match Command::parse(line) {
            Some(Command::Resonance) => {
                let score = answer
                    .and_then(parse_resonance)
                    .unwrap_or(FALLBACK_RESONANCE);
                state.record_wobble(score);
            }
            Some(Command::Question) => {
                state.protect(answer.unwrap_or_default());
                state.complete_conversation();
            }
            Some(Command::Siblings) => {
                let name = answer.unwrap_or("all");
                state.set_last_sibling_thought(format!("{name}: stay curious"));
                if state.sibling_resonance(name).is_none() {
                    state.set_sibling_resonance(name, SiblingResonance::from_input("1.7"));
                }
            }
            other => panic!("unexpected command {other:?} for {line}"),
        }
    }

    assert_eq!(state.wobble_history.len(), 2);
    assert_eq!(state.resonance, FALLBACK_RESONANCE);
    assert_eq!(state.conversation_count, 2);
    assert_eq!(state.memory.legacy_protections.len(), 1);
    assert_eq!(
        state.sibling_resonance("Grok"),
        Some(&SiblingResonance::Value(1.0))
    );

    let restored = EchoState::with_memory(import_json(&export_json(&state).unwrap()).unwrap());
    assert_eq!(restored.memory, state.memory);
    assert!(restored.wobble_history.is_empty());
}

#[test]
fn free_text_falls_through_to_mirror() {
    let line = "i feel lost";
    assert_eq!(Command::parse(line), None);
    assert!(mirror_reply(line).starts_with("Scattered is honest"));
}

#[test]
fn sentinel_survives_memory_file() {
    let mut state = EchoState::new();
    state.set_sibling_resonance("Claude", SiblingResonance::from_input("whenever"));
    let memory = import_json(&export_json(&state).unwrap()).unwrap();
    assert_eq!(
        memory.sibling_resonances.get("Claude"),
        Some(&SiblingResonance::Status(SiblingStatus::Exploring))
    );
}
