//! Gemini TTS backend (`models/{model}:generateContent` with audio output).
//!
//! One blocking HTTP request per call, no retries. The response carries
//! base64 PCM in `candidates[].content.parts[].inlineData.data`; failures come
//! back as `{"error": {"code", "message", "status"}}`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audio::wav::decode_base64_pcm;
use crate::audio::{PcmFormat, RawAudioBuffer};
use crate::error::{NarrateError, Result};
use crate::synthesis::{SpeechSynthesizer, SynthesisRequest};
use crate::voice::{VoiceId, VoiceSelection};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`GeminiSynthesizer`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API root without trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

pub struct GeminiSynthesizer {
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl GeminiSynthesizer {
    /// # Errors
    /// `MissingApiKey` for a blank key, `Synthesis` if the HTTP client cannot
    /// be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(NarrateError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NarrateError::Synthesis(format!("client build failed: {e}")))?;
        Ok(Self { config, client })
    }
}

impl SpeechSynthesizer for GeminiSynthesizer {
    fn name(&self) -> &str {
        "gemini"
    }

    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<RawAudioBuffer> {
        let body = GenerateRequest::from_request(request);
        info!(
            model = self.config.model.as_str(),
            speakers = request.voices.speaker_count(),
            chars = request.text.len(),
            "requesting speech synthesis"
        );

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", self.config.api_key.trim())
            .json(&body)
            .send()
            .map_err(|e| {
                warn!(error = %e, "speech request failed");
                NarrateError::Synthesis(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| NarrateError::Synthesis(format!("reading response body: {e}")))?;

        let audio = parse_response(status.as_u16(), &text).inspect_err(|e| {
            warn!(status = %status, error = %e, "speech API returned no audio");
        })?;
        info!(
            bytes = audio.len(),
            secs = audio.duration_secs(),
            "speech synthesis finished"
        );
        Ok(audio)
    }
}

// ---------------------------------------------------------------------------
// Request payload
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum SpeechConfig {
    VoiceConfig(VoiceConfig),
    MultiSpeakerVoiceConfig(MultiSpeakerVoiceConfig),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiSpeakerVoiceConfig {
    speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerVoiceConfig {
    speaker: String,
    voice_config: VoiceConfig,
}

impl VoiceConfig {
    fn prebuilt(voice: &VoiceId) -> Self {
        Self {
            prebuilt_voice_config: PrebuiltVoiceConfig {
                voice_name: voice.as_str().to_string(),
            },
        }
    }
}

impl GenerateRequest {
    fn from_request(request: &SynthesisRequest) -> Self {
        let speech_config = match &request.voices {
            VoiceSelection::Single { voice } => SpeechConfig::VoiceConfig(VoiceConfig::prebuilt(voice)),
            VoiceSelection::Pair { speakers } => {
                SpeechConfig::MultiSpeakerVoiceConfig(MultiSpeakerVoiceConfig {
                    speaker_voice_configs: speakers
                        .iter()
                        .map(|s| SpeakerVoiceConfig {
                            speaker: s.speaker.clone(),
                            voice_config: VoiceConfig::prebuilt(&s.voice),
                        })
                        .collect(),
                })
            }
        };
        Self {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: request.text.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

/// Turn an HTTP status + body into PCM or a typed failure.
fn parse_response(status: u16, body: &str) -> Result<RawAudioBuffer> {
    if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(body) {
        return Err(NarrateError::Api {
            code: if env.error.code == 0 { status } else { env.error.code },
            status: env.error.status,
            message: env.error.message,
        });
    }
    if !(200..300).contains(&status) {
        return Err(NarrateError::Api {
            code: status,
            status: "HTTP_ERROR".into(),
            message: body.chars().take(512).collect(),
        });
    }

    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| NarrateError::InvalidAudioPayload(format!("malformed response: {e}")))?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| NarrateError::InvalidAudioPayload("response has no candidates".into()))?;
    let finish_reason = candidate.finish_reason.unwrap_or_default();
    let inline = candidate
        .content
        .into_iter()
        .flat_map(|c| c.parts)
        .find_map(|p| p.inline_data)
        .ok_or_else(|| {
            NarrateError::InvalidAudioPayload(format!(
                "response has no audio part (finish reason: {finish_reason})"
            ))
        })?;

    let format = PcmFormat {
        sample_rate: mime_sample_rate(&inline.mime_type)
            .unwrap_or(PcmFormat::SPEECH_API.sample_rate),
        ..PcmFormat::SPEECH_API
    };
    decode_base64_pcm(&inline.data, format)
}

/// Extract `rate=N` from a mime type such as `audio/L16;codec=pcm;rate=24000`.
fn mime_sample_rate(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|p| p.trim().strip_prefix("rate="))
        .find_map(|r| r.parse().ok())
}
