//! Speech synthesis abstraction.
//!
//! The `SpeechSynthesizer` trait decouples narration from any specific
//! backend (offline stub, Gemini TTS, ...). The core never performs the
//! remote call itself: it describes the desired voices in a
//! [`SynthesisRequest`] and hands it to whichever backend was injected.
//!
//! `&mut self` on `synthesize` lets backends keep connection pools or
//! counters; mutation is serialised through `SynthesizerHandle`'s
//! `parking_lot::Mutex`.

pub mod stub;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiSynthesizer};

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::audio::RawAudioBuffer;
use crate::error::Result;
use crate::voice::VoiceSelection;

/// Everything a backend needs for one synthesis attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// Prompt text: optional accent instruction followed by the script.
    pub text: String,
    pub voices: VoiceSelection,
}

impl SynthesisRequest {
    pub fn new(script: &str, accent_hint: &str, voices: VoiceSelection) -> Self {
        Self {
            text: build_prompt(script, accent_hint),
            voices,
        }
    }
}

/// Prepend an accent instruction to `script` when `accent_hint` is non-blank.
///
/// The script itself is passed through verbatim.
pub fn build_prompt(script: &str, accent_hint: &str) -> String {
    let accent = accent_hint.trim();
    if accent.is_empty() {
        script.to_string()
    } else {
        format!("Read the following aloud with a {accent} accent:\n{script}")
    }
}

/// Contract for text-to-speech backends.
pub trait SpeechSynthesizer: Send + 'static {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Perform exactly one synthesis attempt.
    ///
    /// # Returns
    /// Headerless PCM; the caller frames it into a container.
    ///
    /// # Errors
    /// Any transport, API or payload failure. Backends must not retry.
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<RawAudioBuffer>;
}

/// Thread-safe reference-counted handle to any `SpeechSynthesizer` implementor.
#[derive(Clone)]
pub struct SynthesizerHandle(pub Arc<Mutex<dyn SpeechSynthesizer>>);

impl SynthesizerHandle {
    /// Wrap any `SpeechSynthesizer` in a `SynthesizerHandle`.
    pub fn new<S: SpeechSynthesizer>(synth: S) -> Self {
        Self(Arc::new(Mutex::new(synth)))
    }

    /// Name of the wrapped backend.
    pub fn name(&self) -> String {
        self.0.lock().name().to_string()
    }

    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<RawAudioBuffer> {
        self.0.lock().synthesize(request)
    }
}

impl std::fmt::Debug for SynthesizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `try_lock` so formatting never waits on an in-flight request.
        let backend = self.0.try_lock().map(|s| s.name().to_string());
        f.debug_struct("SynthesizerHandle")
            .field("backend", &backend.as_deref().unwrap_or("<busy>"))
            .finish()
    }
}
