use thiserror::Error;

use crate::voice::Gender;

/// All errors produced by narrate-core.
#[derive(Debug, Error)]
pub enum NarrateError {
    #[error("two-speaker mode needs lines like `Name: text`, but no speaker labels were found")]
    MissingSpeakerLabels,

    #[error("two-speaker mode needs exactly 2 distinct speakers, found {found}")]
    SpeakerCountMismatch { found: usize },

    #[error("gender hint must describe exactly 2 speakers, found {found}")]
    GenderCountMismatch { found: usize },

    #[error("unsupported speaker count {0}: only 1 or 2 speakers are supported")]
    UnsupportedVoiceCount(usize),

    #[error("voice pool for {0} speakers is empty")]
    EmptyVoicePool(Gender),

    #[error("no API key configured for the speech backend")]
    MissingApiKey,

    #[error("synthesis request failed: {0}")]
    Synthesis(String),

    #[error("speech API error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    #[error("invalid audio payload: {0}")]
    InvalidAudioPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NarrateError>;
