//! Error types for Voicecraft

use std::io;
use thiserror::Error;

/// Main error type for Voicecraft
#[derive(Error, Debug)]
pub enum VoicecraftError {
    /// The speech engine could not be initialized
    #[error("Speech backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The speech engine was invoked but did not produce audio
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    /// The pitch rewrite of a produced artifact failed
    #[error("Pitch transform failed: {0}")]
    TransformFailed(String),

    /// Caller input rejected at the transport boundary
    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("{0}")]
    Other(String),
}

impl VoicecraftError {
    /// True when the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, VoicecraftError::Validation(_))
    }
}

/// Result type alias for Voicecraft operations
pub type Result<T> = std::result::Result<T, VoicecraftError>;
