//! Routine sequencing
//!
//! This module provides:
//! - **Positions**: The Set → Side → Repetition → Phase traversal as an
//!   explicit iterator (`RoutinePlan`)
//! - **Phase clock**: One tick per second for a phase's duration
//! - **Sequencer**: Drives the plan, pairing every phase with narration

mod clock;
mod position;
mod sequencer;


pub use clock::{PhaseClock, Tick};
pub use position::{Phase, RoutinePlan, SequencerPosition, Side};
pub use sequencer::{RunOutcome, RunSummary, Sequencer};
