//! CLI argument definitions and parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Emotion categories processed when `--emotions` is not given.
pub const DEFAULT_EMOTIONS: [&str; 6] = ["happy", "sad", "angry", "tired", "excited", "neutral"];

/// Batch text-to-speech over emotion-labelled text files.
#[derive(Parser, Debug)]
#[command(name = "emotion-tts-batch")]
#[command(about = "Synthesize data/texts/<emotion>/*.txt with a TTS backend")]
#[command(version)]
pub struct Args {
    /// TTS backend to use: "f5" (F5-TTS) or "tortoise" (Tortoise-TTS)
    #[arg(short, long, value_enum, default_value = "f5")]
    pub backend: BackendKind,

    /// Project root containing data/, models/ and outputs/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Input texts directory [default: <root>/data/texts]
    #[arg(long)]
    pub texts_dir: Option<PathBuf>,

    /// Reference voices directory [default: <root>/data/references]
    #[arg(long)]
    pub references_dir: Option<PathBuf>,

    /// Output directory [default: <root>/outputs/<backend>]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Model assets directory [default: <root>/models]
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Comma-separated emotion categories to process
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_emotion,
        default_values = DEFAULT_EMOTIONS
    )]
    pub emotions: Vec<String>,

    /// Fallback reference voice: "file.wav;transcript text"
    #[arg(long)]
    pub default_ref: Option<String>,

    /// Synthesize without a reference voice when none resolves
    #[arg(long)]
    pub allow_unconditioned: bool,

    /// Backend host address
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Backend port [default: 7860 for f5, 9290 for tortoise]
    #[arg(long)]
    pub port: Option<u16>,

    /// Per-item generation timeout in seconds
    #[arg(long, default_value = "300")]
    pub timeout: u64,

    /// Fixed generation seed (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Speech speed multiplier (0.5 to 2.0)
    #[arg(short, long, default_value = "1.0")]
    pub speed: f32,

    /// Let the backend report its own progress
    #[arg(long)]
    pub show_progress: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Args {
    /// Port of the selected backend, honouring `--port`.
    pub fn backend_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.backend.port())
    }
}

/// TTS backend selection.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// F5-TTS served through its Gradio app
    #[default]
    #[value(name = "f5")]
    F5,

    /// Tortoise-TTS served through its HTTP server
    #[value(name = "tortoise")]
    Tortoise,
}

impl BackendKind {
    /// Identifier used in output directory and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::F5 => "f5",
            BackendKind::Tortoise => "tortoise",
        }
    }

    /// Returns the default backend server port for this backend.
    pub fn port(&self) -> u16 {
        match self {
            BackendKind::F5 => 7860,
            BackendKind::Tortoise => 9290,
        }
    }

    /// Returns the human-readable name of the backend.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::F5 => "F5-TTS",
            BackendKind::Tortoise => "Tortoise-TTS",
        }
    }

    /// Directory under `models/` holding this backend's assets.
    pub fn model_dir_name(&self) -> &'static str {
        match self {
            BackendKind::F5 => "F5-TTS",
            BackendKind::Tortoise => "tortoise-tts",
        }
    }
}

/// Parsed reference audio with transcript.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Path to the audio file.
    pub audio_path: PathBuf,
    /// Transcript of the audio content.
    pub transcript: String,
}

/// Errors that can occur when parsing a reference string.
#[derive(Error, Debug)]
pub enum ReferenceParseError {
    #[error("Invalid format: {0}. Expected 'file.wav;transcript text'")]
    InvalidFormat(String),

    #[error("Audio file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Transcript cannot be empty")]
    EmptyTranscript,
}

impl Reference {
    /// Parse a reference from "file.wav;transcript" format.
    ///
    /// # Examples
    /// ```
    /// use emotion_tts_batch::cli::Reference;
    /// let reference = Reference::parse("audio.wav;Hello world");
    /// ```
    pub fn parse(input: &str) -> Result<Self, ReferenceParseError> {
        // Transcript may contain semicolons
        let Some((path, transcript)) = input.split_once(';') else {
            return Err(ReferenceParseError::InvalidFormat(
                "Missing semicolon separator".to_string(),
            ));
        };

        let audio_path = PathBuf::from(path.trim());
        let transcript = transcript.trim().to_string();

        if !audio_path.is_file() {
            return Err(ReferenceParseError::FileNotFound(audio_path));
        }

        if transcript.is_empty() {
            return Err(ReferenceParseError::EmptyTranscript);
        }

        Ok(Self {
            audio_path,
            transcript,
        })
    }
}

/// Validate an emotion name; it becomes a directory and file name component.
pub fn parse_emotion(input: &str) -> Result<String, String> {
    let name = input.trim();

    if name.is_empty() {
        return Err("Emotion cannot be empty".to_string());
    }

    // Prevent path traversal
    if name == "." || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(format!("Emotion must be a plain directory name: {name}"));
    }

    Ok(name.to_string())
}
