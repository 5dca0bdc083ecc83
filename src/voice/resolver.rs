//! Reference voice resolution strategies.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Transcript of the reference clip bundled with F5-TTS.
pub const F5_DEFAULT_TRANSCRIPT: &str = "Some call me nature, others call me mother nature.";

/// Location of the bundled F5-TTS reference clip, relative to its model directory.
pub const F5_DEFAULT_AUDIO: &str = "src/f5_tts/infer/examples/basic/basic_ref_en.wav";

/// Errors that can occur while resolving a reference voice.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Failed to read transcript {path}: {source}")]
    Transcript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a resolved reference voice came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    Emotion,
    Default,
    Unconditioned,
}

/// The audio sample and transcript a backend conditions its voice on.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceVoice {
    /// Reference clip; `None` lets the backend pick random conditioning.
    pub audio: Option<PathBuf>,
    pub transcript: String,
    pub source: ReferenceSource,
}

/// One step of the reference fallback chain.
pub trait ReferenceResolver {
    /// Returns `Ok(None)` when this strategy has nothing for `emotion`.
    fn resolve(&self, emotion: &str) -> Result<Option<ReferenceVoice>, VoiceError>;

    /// Short label used in log lines.
    fn label(&self) -> &'static str;
}

/// `<references_dir>/<emotion>_ref.wav` with an optional `<emotion>_ref.txt`.
pub struct EmotionReference {
    references_dir: PathBuf,
}

impl EmotionReference {
    pub fn new(references_dir: impl Into<PathBuf>) -> Self {
        Self {
            references_dir: references_dir.into(),
        }
    }

    pub fn audio_path(&self, emotion: &str) -> PathBuf {
        self.references_dir.join(format!("{emotion}_ref.wav"))
    }

    pub fn transcript_path(&self, emotion: &str) -> PathBuf {
        self.references_dir.join(format!("{emotion}_ref.txt"))
    }
}

impl ReferenceResolver for EmotionReference {
    fn resolve(&self, emotion: &str) -> Result<Option<ReferenceVoice>, VoiceError> {
        let audio = self.audio_path(emotion);
        if !audio.is_file() {
            return Ok(None);
        }

        let transcript_path = self.transcript_path(emotion);
        let transcript = if transcript_path.is_file() {
            read_transcript(&transcript_path)?
        } else {
            String::new()
        };

        Ok(Some(ReferenceVoice {
            audio: Some(audio),
            transcript,
            source: ReferenceSource::Emotion,
        }))
    }

    fn label(&self) -> &'static str {
        "emotion"
    }
}

/// A single fallback reference shared by every emotion.
pub struct DefaultReference {
    audio: PathBuf,
    transcript: String,
}

impl DefaultReference {
    pub fn new(audio: impl Into<PathBuf>, transcript: impl Into<String>) -> Self {
        Self {
            audio: audio.into(),
            transcript: transcript.into(),
        }
    }

    /// The clip shipped inside an F5-TTS checkout.
    pub fn f5_bundled(f5_model_dir: &Path) -> Self {
        Self::new(f5_model_dir.join(F5_DEFAULT_AUDIO), F5_DEFAULT_TRANSCRIPT)
    }
}

impl ReferenceResolver for DefaultReference {
    fn resolve(&self, _emotion: &str) -> Result<Option<ReferenceVoice>, VoiceError> {
        if !self.audio.is_file() {
            return Ok(None);
        }

        Ok(Some(ReferenceVoice {
            audio: Some(self.audio.clone()),
            transcript: self.transcript.clone(),
            source: ReferenceSource::Default,
        }))
    }

    fn label(&self) -> &'static str {
        "default"
    }
}

/// Always resolves, without any reference audio.
pub struct Unconditioned;

impl ReferenceResolver for Unconditioned {
    fn resolve(&self, _emotion: &str) -> Result<Option<ReferenceVoice>, VoiceError> {
        Ok(Some(ReferenceVoice {
            audio: None,
            transcript: String::new(),
            source: ReferenceSource::Unconditioned,
        }))
    }

    fn label(&self) -> &'static str {
        "unconditioned"
    }
}

/// Ordered list of strategies; the first one to resolve wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn ReferenceResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy at the lowest priority.
    pub fn with(mut self, resolver: impl ReferenceResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve the reference voice for `emotion`.
    ///
    /// A failing strategy is logged and skipped so a broken transcript file
    /// falls through to the next candidate.
    pub fn resolve(&self, emotion: &str) -> Option<ReferenceVoice> {
        for resolver in &self.resolvers {
            match resolver.resolve(emotion) {
                Ok(Some(voice)) => {
                    debug!(emotion, strategy = resolver.label(), "Reference resolved");
                    return Some(voice);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("{} reference for {emotion} unusable: {e}", resolver.label());
                }
            }
        }

        None
    }
}

fn read_transcript(path: &Path) -> Result<String, VoiceError> {
    std::fs::read_to_string(path)
        .map(|text| text.trim().to_string())
        .map_err(|source| VoiceError::Transcript {
            path: path.to_path_buf(),
            source,
        })
}
