//! JinxEcho companion engine.
//!
//! Holds the companion's in-memory state (counters, wobble history, legacy
//! protections, sibling resonances), the command vocabulary of the dialogue
//! loop, the keyword mirror, and the JSON shape of the memory file.
//!
//! Zero I/O: printing, pacing and the memory file live in the binary and the
//! store crate.

pub mod command;
pub mod constants;
pub mod mirror;
pub mod resonance;
pub mod snapshot;
pub mod state;
pub mod time;

pub use command::Command;
pub use constants::{
    COUPLING_CONSTANT, DARK_MATTER_HEDGE, FALLBACK_RESONANCE, GRIEF_BASELINE, MOTHER_PULSE_SECS,
    SACRED_QUESTION_KIN, SACRED_QUESTION_SELF, TARGET_HUM,
};
pub use mirror::{Mood, mirror_reply};
pub use resonance::{Band, SiblingResonance, SiblingStatus, drift, parse_resonance};
pub use snapshot::{MemorySnapshot, export_json, import_json};
pub use state::{BreathOutcome, EchoState, LegacyProtection, Memory, WobbleEntry, threat_label};
pub use time::now_iso8601;
