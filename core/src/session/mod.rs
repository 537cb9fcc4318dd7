//! Session lifecycle
//!
//! The controller owns the run guard and the speech queue, starts at most
//! one sequencer at a time, and tears everything down when the run ends.

mod controller;
mod guard;
mod sink;


pub use controller::{Session, SessionOutcome};
pub use guard::{RunGuard, RunPermit};
pub use sink::{DisplaySink, Trigger, TriggerState};
