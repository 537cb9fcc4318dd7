//! Sequencer positions and the fixed traversal order
//!
//! ```text
//! Posture
//! └─ for set in 1..=sets
//!    ├─ Prep
//!    ├─ for side in [Left, Right]
//!    │  └─ for rep in 1..=reps_per_side: Lift, Lower
//!    └─ SetTransition (or Complete after the last set)
//! ```

use liftcue_types::RoutineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Posture,
    Prep,
    Lift,
    Lower,
    SetTransition,
    Complete,
}

impl Phase {
    /// Whether each tick of this phase is spoken aloud
    pub fn is_counted(self) -> bool {
        matches!(self, Phase::Posture | Phase::Prep | Phase::Lift)
    }

    /// Configured tick count; 0 for phases that don't run a clock
    pub fn seconds(self, config: &RoutineConfig) -> u32 {
        match self {
            Phase::Posture => config.posture_seconds,
            Phase::Prep => config.prep_seconds,
            Phase::Lift => config.lift_seconds,
            Phase::Lower => config.lower_seconds,
            Phase::SetTransition | Phase::Complete => 0,
        }
    }
}

/// Where the sequencer currently is. Indices are 1-based.
///
/// Posture sits before the first set and is reported as set 1, left, rep 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequencerPosition {
    pub set_index: u32,
    pub side: Side,
    pub rep_index: u32,
    pub phase: Phase,
}

impl SequencerPosition {
    pub fn start() -> Self {
        Self {
            set_index: 1,
            side: Side::Left,
            rep_index: 1,
            phase: Phase::Posture,
        }
    }

    fn at(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// The next position in traversal order, or `None` after `Complete`
    pub fn successor(self, sets: u32, reps_per_side: u32) -> Option<Self> {
        let next = match self.phase {
            Phase::Posture => Self::start().at(Phase::Prep),
            Phase::Prep => self.at(Phase::Lift),
            Phase::Lift => self.at(Phase::Lower),
            Phase::Lower if self.rep_index < reps_per_side => Self {
                rep_index: self.rep_index + 1,
                phase: Phase::Lift,
                ..self
            },
            Phase::Lower if self.side == Side::Left => Self {
                side: Side::Right,
                rep_index: 1,
                phase: Phase::Lift,
                ..self
            },
            Phase::Lower if self.set_index < sets => self.at(Phase::SetTransition),
            Phase::Lower => self.at(Phase::Complete),
            Phase::SetTransition => Self {
                set_index: self.set_index + 1,
                side: Side::Left,
                rep_index: 1,
                phase: Phase::Prep,
            },
            Phase::Complete => return None,
        };
        Some(next)
    }
}

/// Iterator over every position of a routine, in order
#[derive(Debug, Clone)]
pub struct RoutinePlan {
    sets: u32,
    reps_per_side: u32,
    next: Option<SequencerPosition>,
}

impl RoutinePlan {
    pub fn new(config: &RoutineConfig) -> Self {
        Self {
            sets: config.sets.max(1),
            reps_per_side: config.reps_per_side.max(1),
            next: Some(SequencerPosition::start()),
        }
    }
}

impl Iterator for RoutinePlan {
    type Item = SequencerPosition;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.successor(self.sets, self.reps_per_side);
        Some(current)
    }
}
