//! Narrate command-line entry point.
//!
//! Thin host around `narrate-core`: parses flags, loads settings, and hands
//! primitive inputs to the command handlers.

mod commands;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use commands::ScriptInput;
use settings::{default_settings_path, load_settings, save_settings, AppSettings};
use tracing::info;

/// Narrate - paste a script, get a spoken WAV file
#[derive(Parser)]
#[command(name = "narrate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ScriptArgs {
    /// Script file to narrate, or `-` for stdin
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Inline script text
    #[arg(short, long, conflicts_with = "script")]
    text: Option<String>,

    /// Number of speakers (1 or 2)
    #[arg(long, default_value_t = 1)]
    speakers: usize,

    /// Gender hint, e.g. "man", "1 nam 1 nữ", "2 women"
    #[arg(short, long, default_value = "")]
    gender: String,

    /// Accent hint passed to the synthesizer as an instruction
    #[arg(short, long)]
    accent: Option<String>,

    /// Seconds of trailing silence to append
    #[arg(long)]
    silence: Option<f64>,
}

impl From<ScriptArgs> for ScriptInput {
    fn from(a: ScriptArgs) -> Self {
        Self {
            script: a.script,
            text: a.text,
            speakers: a.speakers,
            gender: a.gender,
            accent: a.accent,
            silence: a.silence,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a script and save it as a WAV file
    Generate {
        #[command(flatten)]
        script: ScriptArgs,

        /// Output path (default: narration.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a data:audio/wav;base64 URL instead of writing a file
        #[arg(long)]
        data_url: bool,

        /// Use the offline stub backend (silence) instead of the API
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve voices and print the synthesis request without calling the API
    Plan {
        #[command(flatten)]
        script: ScriptArgs,
    },

    /// List the voice roster
    Voices {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show effective settings, or write a default settings file
    Config {
        /// Write default settings if the file does not exist yet
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("narrate=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli.settings.unwrap_or_else(default_settings_path);
    let mut settings = load_settings(&settings_path);
    settings.apply_env_overrides();

    match cli.command {
        Commands::Generate {
            script,
            output,
            data_url,
            dry_run,
        } => commands::generate(
            &script.into(),
            &settings,
            output.as_deref(),
            data_url,
            dry_run,
        ),
        Commands::Plan { script } => commands::plan(&script.into(), &settings),
        Commands::Voices { json } => commands::voices(&settings, json),
        Commands::Config { init } => {
            if init && !settings_path.exists() {
                save_settings(&settings_path, &AppSettings::default())?;
                info!(path = %settings_path.display(), "wrote default settings");
            }
            commands::show_config(&settings, &settings_path)
        }
    }
}
