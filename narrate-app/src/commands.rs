//! Command handlers behind the `narrate` subcommands.
//!
//! Each handler takes already-parsed arguments plus the effective settings and
//! reports failures with `anyhow` context for display.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use narrate_core::synthesis::stub::StubSynthesizer;
use narrate_core::{
    Gender, GeminiSynthesizer, NarrationRequest, Narrator, NarratorConfig, SynthesizerHandle,
};
use tracing::info;

use crate::settings::{clamp_silence, AppSettings};

/// Inputs shared by `generate` and `plan`.
#[derive(Debug, Clone)]
pub struct ScriptInput {
    /// Script file, or `-` for stdin.
    pub script: Option<PathBuf>,
    /// Inline script text (takes precedence over `script`).
    pub text: Option<String>,
    pub speakers: usize,
    pub gender: String,
    pub accent: Option<String>,
    pub silence: Option<f64>,
}

impl ScriptInput {
    fn read_script(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        match self.script.as_deref() {
            Some(path) if path == Path::new("-") => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading script from stdin")?;
                Ok(buf)
            }
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display())),
            None => anyhow::bail!("no script given: pass --script <file|-> or --text <script>"),
        }
    }

    fn to_request(&self, settings: &AppSettings) -> Result<NarrationRequest> {
        let script = self.read_script()?;
        if script.trim().is_empty() {
            anyhow::bail!("script is empty");
        }
        Ok(NarrationRequest {
            script,
            speaker_count: self.speakers,
            gender_hint: self.gender.clone(),
            accent_hint: self
                .accent
                .clone()
                .unwrap_or_else(|| settings.default_accent.clone()),
            trailing_silence_secs: clamp_silence(
                self.silence.unwrap_or(settings.default_silence_secs),
            ),
        })
    }
}

fn narrator_config(settings: &AppSettings) -> Result<NarratorConfig> {
    Ok(NarratorConfig {
        voice_pool: settings.voice_pool().context("building voice pool")?,
        ..NarratorConfig::default()
    })
}

/// Synthesise and save (or print as a data URL) one narration.
pub fn generate(
    input: &ScriptInput,
    settings: &AppSettings,
    output: Option<&Path>,
    data_url: bool,
    dry_run: bool,
) -> Result<()> {
    let request = input.to_request(settings)?;
    let config = narrator_config(settings)?;

    let handle = if dry_run {
        SynthesizerHandle::new(StubSynthesizer::new())
    } else {
        let gemini = settings
            .gemini_config()
            .context("set NARRATE_API_KEY or apiKey in the settings file")?;
        SynthesizerHandle::new(GeminiSynthesizer::new(gemini)?)
    };

    let narrator = Narrator::new(config, handle);
    let narration = narrator.generate(&request).context("generation failed")?;

    if data_url {
        println!("{}", narration.container.to_data_url());
        return Ok(());
    }

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&narration.file_name));
    narration
        .container
        .write_to(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(
        path = %path.display(),
        secs = narration.container.duration_secs(),
        "narration saved"
    );
    println!("{}", path.display());
    Ok(())
}

/// Print the resolved voices and prompt as JSON without calling the API.
pub fn plan(input: &ScriptInput, settings: &AppSettings) -> Result<()> {
    let request = input.to_request(settings)?;
    let narrator = Narrator::new(
        narrator_config(settings)?,
        SynthesizerHandle::new(StubSynthesizer::new()),
    );
    let plan = narrator.plan(&request)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// List the effective voice roster.
pub fn voices(settings: &AppSettings, json: bool) -> Result<()> {
    let pool = settings.voice_pool()?;
    if json {
        let value = serde_json::json!({
            "male": pool.voices(Gender::Male),
            "female": pool.voices(Gender::Female),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    for gender in [Gender::Male, Gender::Female] {
        let names: Vec<&str> = pool.voices(gender).iter().map(|v| v.as_str()).collect();
        println!("{gender}: {}", names.join(", "));
    }
    Ok(())
}

/// Show the effective settings (API key redacted).
pub fn show_config(settings: &AppSettings, path: &Path) -> Result<()> {
    let runtime = settings.runtime_settings(path);
    println!("{}", serde_json::to_string_pretty(&runtime)?);
    Ok(())
}
