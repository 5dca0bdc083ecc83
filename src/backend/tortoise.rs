//! Tortoise-TTS adapter over a plain HTTP inference server.

use std::time::Duration;

use tracing::debug;

use crate::voice::ReferenceVoice;

use super::Backend;
use super::types::{BackendError, HealthResponse, SynthesisOptions, SynthesizedAudio};

/// Tortoise always generates at this rate.
pub const TORTOISE_SAMPLE_RATE: u32 = 24_000;

const PRESET: &str = "fast";
const SAMPLE_RATE_HEADER: &str = "x-sample-rate";

/// Client for a Tortoise-TTS server exposing `/health` and `/tts`.
pub struct TortoiseBackend {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl TortoiseBackend {
    /// Create a new Tortoise-TTS client.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            base_url: format!("http://{host}:{port}"),
            client: super::http_client(timeout)?,
        })
    }

    /// Get the base URL for this backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Decode a little-endian f32 PCM body.
pub(crate) fn decode_f32le(bytes: &[u8]) -> Result<Vec<f32>, BackendError> {
    if bytes.len() % 4 != 0 {
        return Err(BackendError::InvalidResponse(format!(
            "PCM body of {} bytes is not a whole number of f32 samples",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

impl Backend for TortoiseBackend {
    fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        response
            .json()
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    fn synthesize(
        &self,
        voice: &ReferenceVoice,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<SynthesizedAudio, BackendError> {
        let url = format!("{}/tts", self.base_url);

        let mut form = reqwest::blocking::multipart::Form::new()
            .text("text", text.to_string())
            .text("preset", PRESET)
            .text("k", "1")
            .text("verbose", options.show_progress.to_string());

        if let Some(seed) = options.seed {
            form = form.text("seed", seed.to_string());
        }

        // Without a voice part the server falls back to random latents
        if let Some(audio_path) = &voice.audio {
            let audio_data = std::fs::read(audio_path)
                .map_err(|_| BackendError::FileNotFound(audio_path.display().to_string()))?;

            let file_name = audio_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("reference.wav");

            let voice_part = reqwest::blocking::multipart::Part::bytes(audio_data)
                .file_name(file_name.to_string())
                .mime_str("audio/wav")
                .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

            form = form.part("voice", voice_part);
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        let sample_rate = response
            .headers()
            .get(SAMPLE_RATE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(TORTOISE_SAMPLE_RATE);

        let body = response
            .bytes()
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        let samples = decode_f32le(&body)?;
        debug!(samples = samples.len(), sample_rate, "Tortoise-TTS returned audio");

        Ok(SynthesizedAudio::Samples {
            samples,
            sample_rate,
        })
    }
}
