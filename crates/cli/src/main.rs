use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use mediascribe_core::audio::domain::media_decoder::MediaDecoder;
use mediascribe_core::audio::domain::vocal_separator::VocalSeparator;
use mediascribe_core::audio::infrastructure::demucs_vocal_separator::DemucsVocalSeparator;
use mediascribe_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use mediascribe_core::audio::infrastructure::ffmpeg_cli_decoder::FfmpegCliDecoder;
use mediascribe_core::audio::infrastructure::ffmpeg_silence_detector::FfmpegSilenceDetector;
use mediascribe_core::pipeline::transcribe_use_case::TranscribeUseCase;
use mediascribe_core::shared::constants::{AUDIO_EXTENSIONS, VIDEO_EXTENSIONS};
use mediascribe_core::text::export::{build_transcript_file, make_output_name, ExportInfo};
use mediascribe_core::transcription::domain::decode_policy::{AudioProfile, PrecisionTier};
use mediascribe_core::transcription::domain::progress::ProgressSink;
use mediascribe_core::transcription::domain::run_settings::RunSettings;
use mediascribe_core::transcription::domain::speech_recognizer::SpeechRecognizer;
use mediascribe_core::transcription::infrastructure::model_cache::ModelCache;
use mediascribe_core::transcription::infrastructure::model_resolver;
use mediascribe_core::transcription::infrastructure::whisper_recognizer::WhisperRecognizer;

/// Silence-aware transcription of audio and video files.
#[derive(Parser)]
#[command(name = "mediascribe")]
struct Cli {
    /// Input audio or video file.
    input: PathBuf,

    /// Output transcript file (default: derived from the input name).
    output: Option<PathBuf>,

    /// Recognition language (ISO 639-1 code).
    #[arg(long, default_value = "es")]
    language: String,

    /// Recognition model: small, medium or large.
    #[arg(long, default_value = "small")]
    model: String,

    /// Audio profile: voice or music.
    #[arg(long, default_value = "voice")]
    profile: String,

    /// Precision tier: fast, balanced or max.
    #[arg(long, default_value = "balanced")]
    precision: String,

    /// Silence threshold in dB (default tuned per profile).
    #[arg(long)]
    silence_db: Option<i32>,

    /// Minimum silence duration in seconds (default tuned per profile).
    #[arg(long)]
    min_silence: Option<f64>,

    /// Minimum segment duration in seconds (default tuned per profile).
    #[arg(long)]
    min_segment: Option<f64>,

    /// Adjacent identical lines kept before suppression (default tuned per profile).
    #[arg(long)]
    max_repeats: Option<usize>,

    /// Disable punctuation-run and garbage-line cleanup.
    #[arg(long)]
    no_clean: bool,

    /// Collapse su-u-u / soooo elongations (on by default for music).
    #[arg(long)]
    normalize_elongations: bool,

    /// Isolate vocals with demucs before transcribing (music profile only).
    #[arg(long)]
    isolate_vocals: bool,

    /// Apply light loudness normalization while decoding.
    #[arg(long)]
    normalize: bool,

    /// Write run statistics as JSON to this path.
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let profile: AudioProfile = cli.profile.parse()?;
    let precision: PrecisionTier = cli.precision.parse()?;
    let settings = build_settings(&cli, profile, precision);

    let decoder = FfmpegCliDecoder;
    let duration_sec = decoder.probe_duration(&cli.input)?;
    if duration_sec > 0.0 {
        log::info!("media duration: {duration_sec:.1}s");
    } else {
        log::warn!("media duration unknown; falling back to fixed chunking");
    }

    let work_dir = tempfile::tempdir()?;
    let wav_path = work_dir.path().join("audio.wav");
    eprintln!("Decoding audio...");
    decoder.decode_to_wav(&cli.input, &wav_path, cli.normalize)?;

    let audio_for_run = if cli.isolate_vocals {
        eprintln!("Isolating vocals... (this can take a few minutes)");
        let separator = DemucsVocalSeparator::default();
        separator.separate(&wav_path, &work_dir.path().join("demucs"))?
    } else {
        wav_path.clone()
    };

    let recognizer = load_recognizer(&cli.model)?;
    let mut use_case = TranscribeUseCase::new(
        Box::new(FfmpegSilenceDetector),
        Box::new(FfmpegAudioReader),
        recognizer,
        Box::new(StderrProgress),
    );

    let output = use_case.run(&audio_for_run, duration_sec, &settings)?;
    eprintln!();

    if let Some(stats_path) = &cli.stats_json {
        fs::write(stats_path, serde_json::to_string_pretty(&output.stats)?)?;
        log::info!("stats written to {}", stats_path.display());
    }

    let Some(transcript) = output.transcript else {
        eprintln!("No speech detected. Try another model or adjust segmentation.");
        return Ok(());
    };

    let source_name = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let contents = build_transcript_file(
        &transcript,
        &ExportInfo {
            source_filename: &source_name,
            generated_at: &generated_at,
            language: &cli.language,
            model: &cli.model,
            profile,
            precision,
            duration_sec,
            stats: &output.stats,
        },
    );

    let output_path = cli.output.clone().unwrap_or_else(|| {
        cli.input
            .with_file_name(make_output_name(&source_name, &cli.model, profile, precision))
    });
    fs::write(&output_path, contents)?;
    log::info!("transcript written to {}", output_path.display());
    eprintln!("Transcript written to {}", output_path.display());

    Ok(())
}

fn build_settings(cli: &Cli, profile: AudioProfile, precision: PrecisionTier) -> RunSettings {
    let mut settings = RunSettings::for_profile(profile, &cli.language, &cli.model);
    settings.precision = precision;
    settings.clean_text = !cli.no_clean;
    if cli.normalize_elongations {
        settings.normalize_elongations = true;
    }
    if let Some(db) = cli.silence_db {
        settings.silence_db = db;
    }
    if let Some(sec) = cli.min_silence {
        settings.min_silence_sec = sec;
    }
    if let Some(sec) = cli.min_segment {
        settings.min_segment_sec = sec;
    }
    if let Some(cap) = cli.max_repeats {
        settings.max_consecutive_repeats = cap;
    }
    settings
}

fn load_recognizer(model: &str) -> Result<Box<dyn SpeechRecognizer>, Box<dyn Error>> {
    log::info!("resolving model weights: {model}");
    let weights = model_resolver::resolve(model, Some(Box::new(download_progress)))?;
    eprintln!();

    let cache = ModelCache::new();
    let ctx = cache.get_or_load(model, &weights)?;
    Ok(Box::new(WhisperRecognizer::new(ctx)))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_media(&cli.input) {
        return Err(format!(
            "Unsupported file type: {} (expected one of {:?})",
            cli.input.display(),
            [AUDIO_EXTENSIONS, VIDEO_EXTENSIONS].concat()
        )
        .into());
    }
    if model_resolver::model_weights_url(&cli.model).is_none() {
        return Err(format!("Model must be small, medium or large, got '{}'", cli.model).into());
    }
    if cli.isolate_vocals && cli.profile != "music" {
        return Err("--isolate-vocals requires --profile music".into());
    }
    if let Some(db) = cli.silence_db {
        if db >= 0 {
            return Err(format!("Silence threshold must be negative dB, got {db}").into());
        }
    }
    if let Some(sec) = cli.min_silence {
        if sec <= 0.0 {
            return Err(format!("Minimum silence must be positive, got {sec}").into());
        }
    }
    if let Some(sec) = cli.min_segment {
        if sec <= 0.0 {
            return Err(format!("Minimum segment must be positive, got {sec}").into());
        }
    }
    if let Some(cap) = cli.max_repeats {
        if cap < 2 {
            return Err(format!("Max repeats must be at least 2, got {cap}").into());
        }
    }
    Ok(())
}

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str()) || VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Progress reporting on stderr; status messages go to the log.
struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn progress(&mut self, percent: u8, eta_seconds: Option<f64>) {
        match eta_seconds {
            Some(eta) if eta >= 1.0 => {
                eprint!("\rTranscribing... {percent}% (~{}s left)", eta.round() as u64);
            }
            _ => eprint!("\rTranscribing... {percent}%"),
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading recognition model... {pct}%");
    } else {
        eprint!("\rDownloading recognition model... {downloaded} bytes");
    }
}
