//! Outward-facing collaborators: the display and the start trigger

use crate::narration::DisplayLines;

/// Accepts three lines of text, replacing whatever was shown before
pub trait DisplaySink: Send + Sync {
    fn show(&self, lines: &DisplayLines);
}

/// Lifecycle state pushed to the start trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    /// Nothing has run yet, or the last run was aborted or failed
    Ready,
    /// A session is active; the trigger is disabled
    Running,
    /// The last session completed; the trigger is enabled again
    Finished,
}

impl TriggerState {
    pub fn is_enabled(self) -> bool {
        !matches!(self, TriggerState::Running)
    }
}

/// The external "start requested" control
pub trait Trigger: Send + Sync {
    fn update(&self, state: TriggerState, label: &str);
}
