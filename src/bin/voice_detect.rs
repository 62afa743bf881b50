use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use voice_detector::audio::{load_wav, PcmBuffer};
use voice_detector::error::{log_analysis_error, log_input_error};
use voice_detector::request::{validate_duration, validate_language, DetectionResponse, ErrorResponse};
use voice_detector::{init_logging, AppConfig, Analyzer};

#[derive(Parser, Debug)]
#[command(
    name = "voice_detect",
    about = "Classify speech recordings as AI_GENERATED or HUMAN"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted or unreadable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a WAV recording and print the detection response
    Detect {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "English")]
        language: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the extracted feature record for a WAV recording
    Features {
        #[arg(long)]
        input: PathBuf,
        /// Print the flat name -> value view instead of the nested record
        #[arg(long)]
        flat: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List supported languages
    Languages,
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Detect {
            input,
            language,
            output,
        } => run_detect(&config, &input, &language, output),
        Commands::Features {
            input,
            flat,
            output,
        } => run_features(&config, &input, flat, output),
        Commands::Languages => run_languages(&config),
    }
}

fn run_detect(
    config: &AppConfig,
    input: &Path,
    language: &str,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    match detect(config, input, language) {
        Ok(response) => {
            emit_json(&response, output_path)?;
            Ok(ExitCode::from(0))
        }
        Err(rejection) => {
            emit_json(&rejection, output_path)?;
            Ok(ExitCode::from(1))
        }
    }
}

/// Validate, decode and classify one request
fn detect(config: &AppConfig, input: &Path, language: &str) -> Result<DetectionResponse, ErrorResponse> {
    let context = "detect";
    let reject_input = |err| {
        log_input_error(&err, context);
        ErrorResponse::from_error(&err)
    };

    let language = validate_language(language, &config.input).map_err(reject_input)?;
    let pcm = load_pcm(config, input).map_err(reject_input)?;
    validate_duration(&pcm, &config.input).map_err(reject_input)?;

    let decision = Analyzer::new(config)
        .and_then(|analyzer| analyzer.analyze(&pcm.samples, pcm.sample_rate))
        .map_err(|err| {
            log_analysis_error(&err, context);
            ErrorResponse::from_error(&err)
        })?;

    Ok(DetectionResponse::from_decision(language, &decision))
}

fn run_features(
    config: &AppConfig,
    input: &Path,
    flat: bool,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let pcm = load_pcm(config, input).with_context(|| format!("loading {}", input.display()))?;
    let analyzer = Analyzer::new(config).context("building analyzer")?;
    let features = analyzer
        .extract(&pcm.samples, pcm.sample_rate)
        .with_context(|| format!("extracting features from {}", input.display()))?;

    if flat {
        let map: serde_json::Map<String, serde_json::Value> = features
            .named_values()
            .into_iter()
            .map(|(name, value)| (name, serde_json::Value::from(value)))
            .collect();
        emit_json(&map, output_path)?;
    } else {
        emit_json(&features, output_path)?;
    }
    Ok(ExitCode::from(0))
}

fn run_languages(config: &AppConfig) -> Result<ExitCode> {
    for language in &config.input.supported_languages {
        println!("{language}");
    }
    Ok(ExitCode::from(0))
}

/// Decode a WAV file and bring it to the analysis sample rate
fn load_pcm(config: &AppConfig, input: &Path) -> Result<PcmBuffer, voice_detector::InputError> {
    let pcm = load_wav(input)?;
    tracing::info!(
        path = %input.display(),
        sample_rate = pcm.sample_rate,
        duration_secs = pcm.duration_secs(),
        "decoded input"
    );
    pcm.resampled(config.analysis.sample_rate)
}

fn emit_json<T: Serialize>(value: &T, output_path: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}
