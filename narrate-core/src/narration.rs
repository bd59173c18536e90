//! `Narrator` — one generation attempt from script to playable WAV.
//!
//! ## Flow
//!
//! ```text
//! NarrationRequest
//!     └─► VoiceResolver::resolve     → VoiceSelection (or typed failure)
//!         └─► SynthesisRequest::new  → prompt with accent instruction
//!             └─► SpeechSynthesizer  → raw PCM (single attempt)
//!                 └─► wav::encode    → AudioContainer + trailing silence
//! ```
//!
//! Every failure is terminal for the attempt and returned to the caller as-is.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    audio::{wav, AudioContainer},
    error::Result,
    synthesis::{SynthesisRequest, SynthesizerHandle},
    voice::{VoicePool, VoiceResolver, VoiceSelection},
};

/// File name used when a narration is saved without an explicit path.
pub const DEFAULT_FILE_NAME: &str = "narration.wav";

/// Configuration for `Narrator`.
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub voice_pool: VoicePool,
    /// Suggested download name for produced audio.
    pub file_name: String,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            voice_pool: VoicePool::default(),
            file_name: DEFAULT_FILE_NAME.into(),
        }
    }
}

/// Already-validated primitive inputs from the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct NarrationRequest {
    pub script: String,
    pub speaker_count: usize,
    pub gender_hint: String,
    pub accent_hint: String,
    pub trailing_silence_secs: f64,
}

impl Default for NarrationRequest {
    fn default() -> Self {
        Self {
            script: String::new(),
            speaker_count: 1,
            gender_hint: String::new(),
            accent_hint: String::new(),
            trailing_silence_secs: 0.0,
        }
    }
}

/// A finished narration, ready to play or save.
#[derive(Debug, Clone)]
pub struct Narration {
    pub container: AudioContainer,
    pub voices: VoiceSelection,
    pub file_name: String,
}

pub struct Narrator {
    config: NarratorConfig,
    resolver: VoiceResolver,
    synth: SynthesizerHandle,
}

impl Narrator {
    pub fn new(config: NarratorConfig, synth: SynthesizerHandle) -> Self {
        let resolver = VoiceResolver::new(config.voice_pool.clone());
        Self {
            config,
            resolver,
            synth,
        }
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Resolve voices and build the backend request without synthesising.
    ///
    /// # Errors
    /// Any voice-resolution failure (`UnsupportedVoiceCount`,
    /// `MissingSpeakerLabels`, `SpeakerCountMismatch`, `GenderCountMismatch`).
    pub fn plan(&self, request: &NarrationRequest) -> Result<SynthesisRequest> {
        let voices =
            self.resolver
                .resolve(request.speaker_count, &request.script, &request.gender_hint)?;
        debug!(?voices, "voice plan ready");
        Ok(SynthesisRequest::new(
            &request.script,
            &request.accent_hint,
            voices,
        ))
    }

    /// Run one full generation attempt.
    ///
    /// # Errors
    /// Resolution failures from [`plan`](Self::plan) and whatever the
    /// synthesis backend reports. Encoding itself never fails.
    pub fn generate(&self, request: &NarrationRequest) -> Result<Narration> {
        let plan = self.plan(request)?;
        let pcm = self.synth.synthesize(&plan)?;
        let container = wav::encode(&pcm, request.trailing_silence_secs);
        info!(
            backend = %self.synth.name(),
            speakers = plan.voices.speaker_count(),
            bytes = container.len(),
            secs = container.duration_secs(),
            "narration generated"
        );
        Ok(Narration {
            container,
            voices: plan.voices,
            file_name: self.config.file_name.clone(),
        })
    }
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("config", &self.config)
            .field("synth", &self.synth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NarrateError;
    use crate::synthesis::stub::StubSynthesizer;

    fn narrator() -> Narrator {
        Narrator::new(
            NarratorConfig::default(),
            SynthesizerHandle::new(StubSynthesizer::new()),
        )
    }

    #[test]
    fn plan_prepends_accent_and_picks_single_voice() {
        let plan = narrator()
            .plan(&NarrationRequest {
                script: "Hello".into(),
                accent_hint: "Southern".into(),
                gender_hint: "man".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(plan.text.starts_with("Read the following aloud with a Southern accent:"));
        assert_eq!(
            plan.voices,
            VoiceSelection::Single {
                voice: VoicePool::default()
                    .default_voice(crate::voice::Gender::Male)
                    .clone()
            }
        );
    }

    #[test]
    fn unsupported_count_fails_before_synthesis() {
        let err = narrator()
            .generate(&NarrationRequest {
                script: "A: x\nB: y".into(),
                speaker_count: 4,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, NarrateError::UnsupportedVoiceCount(4)));
    }

    #[test]
    fn generate_appends_requested_silence() {
        let narration = narrator()
            .generate(&NarrationRequest {
                script: "one two three four".into(),
                trailing_silence_secs: 1.0,
                ..Default::default()
            })
            .unwrap();
        // 4 words × 0.25 s from the stub, plus 1 s of padding.
        assert_eq!(narration.container.payload().len(), 48_000 * 2);
        assert_eq!(narration.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn debug_names_the_backend() {
        assert!(format!("{:?}", narrator()).contains("\"stub\""));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: NarrationRequest =
            serde_json::from_str(r#"{"script":"A: hi","genderHint":"2 nam"}"#).unwrap();
        assert_eq!(req.speaker_count, 1);
        assert_eq!(req.gender_hint, "2 nam");
        assert_eq!(req.trailing_silence_secs, 0.0);
    }
}
