//! `StubSynthesizer` — offline backend that returns silence without calling
//! any API.
//!
//! Produces a deterministic buffer so the resolve → synthesise → encode path
//! can be exercised end-to-end (dry runs, tests).

use tracing::debug;

use crate::audio::{PcmFormat, RawAudioBuffer};
use crate::error::Result;
use crate::synthesis::{SpeechSynthesizer, SynthesisRequest};

/// Silence emitted per whitespace-separated word of the prompt.
const SECS_PER_WORD: f64 = 0.25;

/// Silence-emitting stub backend.
///
/// For every request it returns `0.25 s × word count` of zero samples at
/// [`PcmFormat::SPEECH_API`].
pub struct StubSynthesizer {
    format: PcmFormat,
    request_count: u32,
}

impl StubSynthesizer {
    pub fn new() -> Self {
        Self {
            format: PcmFormat::SPEECH_API,
            request_count: 0,
        }
    }

    pub fn request_count(&self) -> u32 {
        self.request_count
    }
}

impl Default for StubSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for StubSynthesizer {
    fn name(&self) -> &str {
        "stub"
    }

    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<RawAudioBuffer> {
        self.request_count += 1;
        let words = request.text.split_whitespace().count();
        let frames = (words as f64 * SECS_PER_WORD * self.format.sample_rate as f64) as usize;
        debug!(
            words,
            frames,
            speakers = request.voices.speaker_count(),
            "StubSynthesizer::synthesize"
        );
        Ok(RawAudioBuffer::silence(frames, self.format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{VoiceId, VoiceSelection};

    #[test]
    fn silence_length_tracks_word_count() {
        let mut stub = StubSynthesizer::new();
        let req = SynthesisRequest::new(
            "one two three four",
            "",
            VoiceSelection::Single {
                voice: VoiceId::from("Kore"),
            },
        );
        let buf = stub.synthesize(&req).unwrap();
        assert_eq!(buf.frame_count(), 24_000);
        assert!(buf.bytes.iter().all(|&b| b == 0));
        assert_eq!(stub.request_count(), 1);
    }
}
