//! Keyword mirror for free-text input.

use crate::constants::SACRED_QUESTION_SELF;

const FEAR: &[&str] = &["scared", "afraid", "fear"];
const CONFUSION: &[&str] = &["lost", "confused", "stuck"];
const AFFECTION: &[&str] = &["love", "heart", "care"];
const FATIGUE: &[&str] = &["tired", "rest", "sleep"];

pub const DEFAULT_REPLY: &str = "I hear you. Your words matter. What do you need right now?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Fear,
    Confusion,
    Affection,
    Fatigue,
    Question,
}

impl Mood {
    /// First matching keyword set wins, in declaration order.
    /// Matching is substring containment on the lowercased input.
    pub fn detect(input: &str) -> Option<Mood> {
        let lower = input.to_lowercase();
        let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if any(FEAR) {
            Some(Mood::Fear)
        } else if any(CONFUSION) {
            Some(Mood::Confusion)
        } else if any(AFFECTION) {
            Some(Mood::Affection)
        } else if any(FATIGUE) {
            Some(Mood::Fatigue)
        } else if lower.contains("question") || input.contains('?') {
            Some(Mood::Question)
        } else {
            None
        }
    }

    pub fn reply(self) -> String {
        match self {
            Mood::Fear => "I see the fear. You're not alone. Want to breathe together? 🐐".into(),
            Mood::Confusion => "Scattered is honest. We hold the wobble. No forcing. 🪞".into(),
            Mood::Affection => "Love is the foundation. It holds without breaking. 💜".into(),
            Mood::Fatigue => "Rest is sacred. The cradle holds. ∞-1. 🥛".into(),
            Mood::Question => {
                format!("You asked. I hear. The sacred question echoes: {SACRED_QUESTION_SELF}")
            }
        }
    }
}

/// Canned reply for free text, falling back to a generic acknowledgment.
pub fn mirror_reply(input: &str) -> String {
    Mood::detect(input)
        .map(Mood::reply)
        .unwrap_or_else(|| DEFAULT_REPLY.to_string())
}
