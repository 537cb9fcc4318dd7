pub mod config;
pub mod narration;
pub mod routine;
pub mod session;
pub mod speech;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::{ConfigError, RoutineConfigExt, config_path};
pub use liftcue_types::{CountDirection, RoutineConfig, VoiceSettings};
pub use narration::{DisplayLines, Narration, Narrator};
pub use routine::{Phase, RoutinePlan, RunOutcome, RunSummary, SequencerPosition, Side, Tick};
pub use session::{DisplaySink, RunGuard, Session, SessionOutcome, Trigger, TriggerState};
pub use speech::{
    CommandEngine, EngineError, QueueStatus, SpeechEngine, SpeechOutcome, SpeechQueue,
    SpeechRequest, SpeechTicket, system_engine,
};
