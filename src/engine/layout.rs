//! Directory layout, output naming, and startup checks.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cli::{Args, BackendKind, Reference};
use crate::voice::{DefaultReference, EmotionReference, ResolverChain, Unconditioned};

/// Unrecoverable problems found before any item is processed.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("{backend} model directory not found at {path}")]
    ModelDirMissing { backend: &'static str, path: PathBuf },

    #[error("Texts directory not found at {0}")]
    TextsDirMissing(PathBuf),
}

/// Where inputs are read from and outputs are written to.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLayout {
    pub backend: BackendKind,
    pub texts_dir: PathBuf,
    pub references_dir: PathBuf,
    pub output_dir: PathBuf,
    pub models_dir: PathBuf,
}

impl BatchLayout {
    /// Standard layout under a project root.
    pub fn new(root: &Path, backend: BackendKind) -> Self {
        Self {
            backend,
            texts_dir: root.join("data").join("texts"),
            references_dir: root.join("data").join("references"),
            output_dir: root.join("outputs").join(backend.as_str()),
            models_dir: root.join("models"),
        }
    }

    /// Standard layout with any directory overrides from the command line.
    pub fn from_args(args: &Args) -> Self {
        let mut layout = Self::new(&args.root, args.backend);

        if let Some(dir) = &args.texts_dir {
            layout.texts_dir = dir.clone();
        }
        if let Some(dir) = &args.references_dir {
            layout.references_dir = dir.clone();
        }
        if let Some(dir) = &args.output_dir {
            layout.output_dir = dir.clone();
        }
        if let Some(dir) = &args.models_dir {
            layout.models_dir = dir.clone();
        }

        layout
    }

    /// Asset directory of the selected backend.
    pub fn model_dir(&self) -> PathBuf {
        self.models_dir.join(self.backend.model_dir_name())
    }

    pub fn emotion_input_dir(&self, emotion: &str) -> PathBuf {
        self.texts_dir.join(emotion)
    }

    pub fn emotion_output_dir(&self, emotion: &str) -> PathBuf {
        self.output_dir.join(emotion)
    }

    /// `<backend>-<emotion>-<stem>.wav`
    pub fn output_file_name(&self, emotion: &str, stem: &str) -> String {
        format!("{}-{emotion}-{stem}.wav", self.backend.as_str())
    }

    pub fn output_path(&self, emotion: &str, stem: &str) -> PathBuf {
        self.emotion_output_dir(emotion)
            .join(self.output_file_name(emotion, stem))
    }

    /// Fail fast when required inputs are missing.
    pub fn check(&self) -> Result<(), SetupError> {
        let model_dir = self.model_dir();
        if !model_dir.is_dir() {
            return Err(SetupError::ModelDirMissing {
                backend: self.backend.name(),
                path: model_dir,
            });
        }

        if !self.texts_dir.is_dir() {
            return Err(SetupError::TextsDirMissing(self.texts_dir.clone()));
        }

        Ok(())
    }

    /// Reference fallback chain for this backend.
    ///
    /// An explicit `default` replaces the backend's bundled one. Only F5-TTS
    /// ships a bundled reference.
    pub fn resolver_chain(
        &self,
        default: Option<Reference>,
        allow_unconditioned: bool,
    ) -> ResolverChain {
        let mut chain = ResolverChain::new().with(EmotionReference::new(&self.references_dir));

        match (default, self.backend) {
            (Some(reference), _) => {
                chain = chain.with(DefaultReference::new(
                    reference.audio_path,
                    reference.transcript,
                ));
            }
            (None, BackendKind::F5) => {
                chain = chain.with(DefaultReference::f5_bundled(&self.model_dir()));
            }
            (None, BackendKind::Tortoise) => {}
        }

        if allow_unconditioned {
            chain = chain.with(Unconditioned);
        }

        chain
    }
}
