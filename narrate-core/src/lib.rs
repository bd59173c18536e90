//! # narrate-core
//!
//! Script-to-speech SDK: voice assignment, speech synthesis backends and WAV
//! packaging.
//!
//! ## Architecture
//!
//! ```text
//! script + hints → VoiceResolver → SynthesisRequest → SpeechSynthesizer
//!                                                          │
//!                                                     raw PCM bytes
//!                                                          │
//!                                        wav::encode (+ trailing silence)
//!                                                          │
//!                                                   AudioContainer
//! ```
//!
//! The resolver and encoder are pure; the only I/O is inside the injected
//! synthesis backend.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod narration;
pub mod synthesis;
pub mod voice;

// Convenience re-exports for downstream crates
pub use audio::{encode, AudioContainer, PcmFormat, RawAudioBuffer};
pub use error::NarrateError;
pub use narration::{Narration, NarrationRequest, Narrator, NarratorConfig};
pub use synthesis::{SpeechSynthesizer, SynthesisRequest, SynthesizerHandle};
pub use voice::{Gender, SpeakerVoice, VoiceId, VoicePool, VoiceResolver, VoiceSelection};

#[cfg(feature = "gemini")]
pub use synthesis::{GeminiConfig, GeminiSynthesizer};
