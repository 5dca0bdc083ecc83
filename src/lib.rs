//! emotion-tts-batch: batch text-to-speech over emotion-labelled corpora.
//!
//! This crate walks `data/texts/<emotion>/*.txt`, resolves a reference voice
//! per emotion, and asks a TTS backend (F5-TTS or Tortoise-TTS) to synthesize
//! each text into `outputs/<backend>/<emotion>/<backend>-<emotion>-<stem>.wav`.

pub mod audio;
pub mod backend;
pub mod cli;
pub mod engine;
pub mod voice;
