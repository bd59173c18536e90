//! Persistent application settings (JSON file in app data directory).
//!
//! Environment variables win over the file: `NARRATE_API_KEY` (or
//! `GEMINI_API_KEY`), `NARRATE_MODEL`, `NARRATE_BASE_URL`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use narrate_core::synthesis::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use narrate_core::{GeminiConfig, NarrateError, VoicePool};
use serde::{Deserialize, Serialize};

/// Upper bound on trailing silence, from the settings file or the CLI.
pub const MAX_SILENCE_SECS: f64 = 60.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub default_silence_secs: f64,
    pub default_accent: String,
    /// Overrides the built-in male roster when non-empty.
    pub male_voices: Vec<String>,
    /// Overrides the built-in female roster when non-empty.
    pub female_voices: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_silence_secs: 0.0,
            default_accent: String::new(),
            male_voices: Vec::new(),
            female_voices: Vec::new(),
        }
    }
}

/// Settings as shown to the user: the key itself is never echoed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSettings {
    pub settings_path: String,
    pub has_api_key: bool,
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub default_silence_secs: f64,
    pub default_accent: String,
    pub male_voices: Vec<String>,
    pub female_voices: Vec<String>,
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.api_key = self
            .api_key
            .as_ref()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.model = normalize_or(&self.model, DEFAULT_MODEL);
        self.base_url = normalize_or(&self.base_url, DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        self.request_timeout_secs = self.request_timeout_secs.clamp(5, 600);
        self.default_silence_secs = clamp_silence(self.default_silence_secs);
        self.default_accent = self.default_accent.trim().to_string();
        self.male_voices = normalize_voice_names(&self.male_voices);
        self.female_voices = normalize_voice_names(&self.female_voices);
    }

    /// Apply `NARRATE_*` environment overrides, then re-normalize.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = env_value("NARRATE_API_KEY").or_else(|| env_value("GEMINI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = env_value("NARRATE_MODEL") {
            self.model = model;
        }
        if let Some(url) = env_value("NARRATE_BASE_URL") {
            self.base_url = url;
        }
        self.normalize();
    }

    pub fn voice_pool(&self) -> Result<VoicePool, NarrateError> {
        let defaults = VoicePool::default();
        let pick = |custom: &[String], gender| -> Vec<String> {
            if custom.is_empty() {
                defaults
                    .voices(gender)
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect()
            } else {
                custom.to_vec()
            }
        };
        VoicePool::new(
            pick(&self.male_voices, narrate_core::Gender::Male),
            pick(&self.female_voices, narrate_core::Gender::Female),
        )
    }

    /// # Errors
    /// `MissingApiKey` when neither the file nor the environment set a key.
    pub fn gemini_config(&self) -> Result<GeminiConfig, NarrateError> {
        let key = self.api_key.clone().ok_or(NarrateError::MissingApiKey)?;
        let mut config = GeminiConfig::new(key);
        config.model = self.model.clone();
        config.base_url = self.base_url.clone();
        config.timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(config)
    }

    pub fn runtime_settings(&self, path: &Path) -> RuntimeSettings {
        RuntimeSettings {
            settings_path: path.display().to_string(),
            has_api_key: self.api_key.is_some(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            default_silence_secs: self.default_silence_secs,
            default_accent: self.default_accent.clone(),
            male_voices: self.male_voices.clone(),
            female_voices: self.female_voices.clone(),
        }
    }
}

/// Clamp a silence duration to `0..=MAX_SILENCE_SECS`; non-finite becomes 0.
pub fn clamp_silence(secs: f64) -> f64 {
    if secs.is_finite() {
        secs.clamp(0.0, MAX_SILENCE_SECS)
    } else {
        0.0
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_or(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.into()
    } else {
        trimmed.into()
    }
}

fn normalize_voice_names(raw: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for name in raw {
        let normalized = name.trim();
        if normalized.is_empty() {
            continue;
        }
        if out.iter().any(|n: &String| n.eq_ignore_ascii_case(normalized)) {
            continue;
        }
        out.push(normalized.to_string());
    }
    out
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Narrate")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".config")
            })
            .join("narrate")
            .join("settings.json")
    }
}

/// Load settings from `path`; a missing or unreadable file yields defaults.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
