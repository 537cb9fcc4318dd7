//! Shared configuration types for liftcue
//!
//! This crate contains the serializable routine and voice settings shared
//! between the sequencing engine (liftcue-core) and the terminal front end.
//!
//! Note: Persistence methods (load/save/validate) are provided by liftcue-core
//! via the `RoutineConfigExt` trait, as they require confy and toml.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Count Direction
// ─────────────────────────────────────────────────────────────────────────────

/// Which value a phase tick carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountDirection {
    /// Elapsed seconds: 1, 2, ..., n
    #[default]
    Ascending,
    /// Remaining seconds: n, n-1, ..., 1
    Descending,
}

impl CountDirection {
    /// Value shown for the 1-based tick `index` of a phase lasting `total` ticks
    pub fn value(self, index: u32, total: u32) -> u32 {
        match self {
            CountDirection::Ascending => index,
            CountDirection::Descending => total - index + 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Voice Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Master enable for spoken narration
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// BCP 47 language tag, e.g. "en-GB" or "ko-KR"
    #[serde(default = "default_language")]
    pub language: String,

    /// Speaking rate for instructions (1.0 = engine normal)
    #[serde(default = "default_instruction_rate")]
    pub instruction_rate: f32,

    /// Speaking rate for tick counts
    #[serde(default = "default_count_rate")]
    pub count_rate: f32,

    #[serde(default = "default_unit")]
    pub pitch: f32,

    /// Volume level (0.0-1.0)
    #[serde(default = "default_unit")]
    pub volume: f32,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en-GB".to_string()
}

fn default_instruction_rate() -> f32 {
    0.95
}

fn default_count_rate() -> f32 {
    1.05
}

fn default_unit() -> f32 {
    1.0
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            language: default_language(),
            instruction_rate: default_instruction_rate(),
            count_rate: default_count_rate(),
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Routine Config
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable description of one exercise session.
///
/// A duration of 0 skips the phase's ticks; its instruction is still spoken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineConfig {
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default = "default_reps_per_side")]
    pub reps_per_side: u32,
    #[serde(default = "default_lift_seconds")]
    pub lift_seconds: u32,
    #[serde(default = "default_lower_seconds")]
    pub lower_seconds: u32,
    #[serde(default = "default_prep_seconds")]
    pub prep_seconds: u32,
    #[serde(default = "default_posture_seconds")]
    pub posture_seconds: u32,

    /// Pause between sets, after the set-transition narration (no ticking)
    #[serde(default = "default_set_pause_ms")]
    pub set_pause_ms: u64,

    #[serde(default)]
    pub count_direction: CountDirection,

    #[serde(default)]
    pub voice: VoiceSettings,
}

fn default_sets() -> u32 {
    3
}

fn default_reps_per_side() -> u32 {
    5
}

fn default_lift_seconds() -> u32 {
    5
}

fn default_lower_seconds() -> u32 {
    3
}

fn default_prep_seconds() -> u32 {
    2
}

fn default_posture_seconds() -> u32 {
    5
}

fn default_set_pause_ms() -> u64 {
    1000
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            reps_per_side: default_reps_per_side(),
            lift_seconds: default_lift_seconds(),
            lower_seconds: default_lower_seconds(),
            prep_seconds: default_prep_seconds(),
            posture_seconds: default_posture_seconds(),
            set_pause_ms: default_set_pause_ms(),
            count_direction: CountDirection::default(),
            voice: VoiceSettings::default(),
        }
    }
}

impl RoutineConfig {
    pub fn voice_enabled(&self) -> bool {
        self.voice.enabled
    }

    pub fn language_tag(&self) -> &str {
        &self.voice.language
    }

    /// Ticks in one full set: prep plus both sides' lift and lower phases.
    /// Saturates instead of overflowing.
    pub fn ticks_per_set(&self) -> u64 {
        let rep = u64::from(self.lift_seconds) + u64::from(self.lower_seconds);
        u64::from(self.reps_per_side)
            .saturating_mul(2)
            .saturating_mul(rep)
            .saturating_add(u64::from(self.prep_seconds))
    }

    /// Ticks across the whole session, posture included
    pub fn total_ticks(&self) -> u64 {
        u64::from(self.sets)
            .saturating_mul(self.ticks_per_set())
            .saturating_add(u64::from(self.posture_seconds))
    }
}
