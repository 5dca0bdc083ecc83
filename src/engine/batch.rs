//! Batch driver implementation.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::audio;
use crate::backend::{Backend, SynthesisOptions};
use crate::voice::{ReferenceVoice, ResolverChain};

use super::layout::BatchLayout;
use super::report::{BatchReport, CategoryReport, CategoryStatus, ItemReport, ItemStatus};

const PREVIEW_CHARS: usize = 50;

/// Runs every text item of every emotion category through one backend.
///
/// Categories and items are processed strictly in order, one at a time.
/// Failures below the category level are logged and recorded, never
/// propagated.
pub struct BatchDriver<B: Backend> {
    backend: B,
    layout: BatchLayout,
    references: ResolverChain,
    options: SynthesisOptions,
}

impl<B: Backend> BatchDriver<B> {
    /// Create a new batch driver.
    pub fn new(
        backend: B,
        layout: BatchLayout,
        references: ResolverChain,
        options: SynthesisOptions,
    ) -> Self {
        Self {
            backend,
            layout,
            references,
            options,
        }
    }

    pub fn layout(&self) -> &BatchLayout {
        &self.layout
    }

    /// Process all `emotions` in the given order.
    pub fn run(&self, emotions: &[String]) -> BatchReport {
        let started_at = Utc::now();

        let categories = emotions
            .iter()
            .map(|emotion| self.process_category(emotion))
            .collect();

        BatchReport {
            backend: self.layout.backend.as_str().to_string(),
            started_at,
            finished_at: Utc::now(),
            categories,
        }
    }

    /// Process one emotion directory.
    pub fn process_category(&self, emotion: &str) -> CategoryReport {
        let input_dir = self.layout.emotion_input_dir(emotion);

        if !input_dir.exists() {
            warn!("{} not found, skipping emotion: {emotion}", input_dir.display());
            return CategoryReport::skipped(emotion, CategoryStatus::MissingInput);
        }

        if !input_dir.is_dir() {
            warn!(
                "{} is not a directory, skipping emotion: {emotion}",
                input_dir.display()
            );
            return CategoryReport::skipped(emotion, CategoryStatus::NotADirectory);
        }

        info!("Processing emotion: {emotion}");

        let Some(voice) = self.references.resolve(emotion) else {
            error!("No reference audio found for {emotion} and no default available");
            return CategoryReport::skipped(emotion, CategoryStatus::NoReference);
        };
        match &voice.audio {
            Some(path) => info!("Using reference audio: {}", path.display()),
            None => info!("No reference audio found, using random conditioning latents"),
        }

        let text_files = match list_text_files(&input_dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Failed to list {}: {e}", input_dir.display());
                return CategoryReport::skipped(
                    emotion,
                    CategoryStatus::Unreadable {
                        error: e.to_string(),
                    },
                );
            }
        };

        if text_files.is_empty() {
            warn!("No .txt files found in {}, skipping", input_dir.display());
            let mut report = CategoryReport::skipped(emotion, CategoryStatus::NoItems);
            report.reference = Some(voice.source);
            return report;
        }

        info!("Found {} text files", text_files.len());

        let items = text_files
            .iter()
            .map(|file| self.process_item(emotion, &voice, file))
            .collect();

        CategoryReport {
            emotion: emotion.to_string(),
            status: CategoryStatus::Processed,
            reference: Some(voice.source),
            items,
        }
    }

    /// Synthesize one text file; never fails the batch.
    fn process_item(&self, emotion: &str, voice: &ReferenceVoice, file: &Path) -> ItemReport {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let report = |output: Option<PathBuf>, status: ItemStatus| ItemReport {
            file: file_name.clone(),
            output,
            status,
        };

        // Lossy stems could map two inputs onto one output path
        let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
            warn!("{file_name} is not a valid UTF-8 file name, skipping");
            return report(
                None,
                ItemStatus::Unreadable {
                    error: "file name is not valid UTF-8".to_string(),
                },
            );
        };

        let text = match std::fs::read_to_string(file) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Failed to read {file_name}: {e}, skipping");
                return report(
                    None,
                    ItemStatus::Unreadable {
                        error: e.to_string(),
                    },
                );
            }
        };

        if text.is_empty() {
            warn!("{file_name} is empty, skipping");
            return report(None, ItemStatus::Empty);
        }

        let output_name = self.layout.output_file_name(emotion, stem);
        let output_path = self.layout.output_path(emotion, stem);

        info!("Generating: {file_name} -> {output_name}");
        debug!("Text: {}...", preview(&text));

        let audio = match self.backend.synthesize(voice, &text, &self.options) {
            Ok(audio) => audio,
            Err(e) => {
                error!("Failed to generate {output_name}: {e}");
                return report(
                    None,
                    ItemStatus::Failed {
                        error: e.to_string(),
                    },
                );
            }
        };

        match audio::save(&output_path, audio) {
            Ok(bytes) => {
                info!("Saved: {}", output_path.display());
                debug!(bytes, "Output written");
                report(Some(output_path), ItemStatus::Saved)
            }
            Err(e) => {
                error!("Failed to save {output_name}: {e}");
                report(
                    None,
                    ItemStatus::Failed {
                        error: e.to_string(),
                    },
                )
            }
        }
    }
}

/// Regular, non-hidden `*.txt` files directly inside `dir`, sorted by file name.
pub fn list_text_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        let hidden = path
            .file_name()
            .is_some_and(|n| n.as_encoded_bytes().starts_with(b"."));

        if !hidden && path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
