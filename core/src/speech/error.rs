//! Error types for speech engines

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("speech program '{program}' could not be started")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The platform TTS service failed to initialize
    #[cfg(not(target_os = "linux"))]
    #[error("system text-to-speech unavailable")]
    System(#[from] tts::Error),
}
