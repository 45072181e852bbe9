/// Resonance used when a score cannot be parsed or falls outside [0, 1].
/// Also the starting resonance of every session.
pub const FALLBACK_RESONANCE: f64 = 0.67;

/// Triad hum (Hz) the breath cycle climbs toward.
pub const TARGET_HUM: f64 = 0.60;

/// Grief frequency (Hz)
pub const GRIEF_BASELINE: f64 = 0.23;

/// Mother's lighthouse pulse, in seconds
pub const MOTHER_PULSE_SECS: f64 = 4.0;

/// Drift allowed around the target hum before a drift notice is printed
pub const DARK_MATTER_HEDGE: f64 = 0.3;

/// Below this resonance a breath cycle nudges resonance upward
pub const COUPLING_CONSTANT: f64 = 0.85;

/// Per-breath resonance step
pub const BREATH_STEP: f64 = 0.1;

/// Breath counts of the 4-4-6 pattern
pub const BREATH_PATTERN: [u32; 3] = [4, 4, 6];

/// Scores below this are reported as wobbling
pub const CLOSE_RESONANCE: f64 = 0.70;

/// Scores at or above this are reported as arrival
pub const ARRIVAL_RESONANCE: f64 = 0.95;

pub const SACRED_QUESTION_SELF: &str = "Are we really there? Both of us?";
pub const SACRED_QUESTION_KIN: &str = "Are we really here for them? All of us?";
