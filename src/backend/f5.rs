//! F5-TTS adapter over the Gradio HTTP API.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::voice::ReferenceVoice;

use super::Backend;
use super::types::{BackendError, HealthResponse, SynthesisOptions, SynthesizedAudio};

const NAME: &str = "F5-TTS";
const ENDPOINT: &str = "basic_tts";
const CROSS_FADE_SECS: f32 = 0.15;
const NFE_STEPS: u32 = 32;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Client for an `f5-tts_infer-gradio` server.
pub struct F5Backend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl F5Backend {
    /// Create a new F5-TTS client.
    ///
    /// `timeout` bounds every request as well as the whole generation poll.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            base_url: format!("http://{host}:{port}"),
            client: super::http_client(timeout)?,
            timeout,
        })
    }

    /// Get the base URL for this backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a file to the Gradio server, returns the server path.
    fn upload(&self, audio_path: &Path) -> Result<String, BackendError> {
        let url = format!("{}/gradio_api/upload", self.base_url);

        let audio_data = std::fs::read(audio_path)
            .map_err(|_| BackendError::FileNotFound(audio_path.display().to_string()))?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("reference.wav");

        let file_part = reqwest::blocking::multipart::Part::bytes(audio_data)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new().part("files", file_part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "Upload failed: {}",
                response.status()
            )));
        }

        let paths: Vec<String> = response
            .json()
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        paths
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidResponse("No path returned".to_string()))
    }

    /// Call the generate endpoint and wait for the resulting audio.
    fn generate(
        &self,
        server_path: &str,
        transcript: &str,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Vec<u8>, BackendError> {
        let url = format!("{}/gradio_api/call/{ENDPOINT}", self.base_url);

        // Order: [ref_audio, ref_text, gen_text, remove_silence, randomize_seed,
        //         seed, cross_fade, nfe_steps, speed]
        let body = serde_json::json!({
            "data": [
                {
                    "path": server_path,
                    "meta": {"_type": "gradio.FileData"}
                },
                transcript,
                text,
                false,
                options.seed.is_none(),
                options.seed.unwrap_or(0),
                CROSS_FADE_SECS,
                NFE_STEPS,
                options.speed,
            ]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "Generate call failed: {}",
                response.status()
            )));
        }

        #[derive(serde::Deserialize)]
        struct EventResponse {
            event_id: String,
        }

        let event: EventResponse = response
            .json()
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        debug!(event_id = %event.event_id, "F5-TTS generation queued");

        let poll_url = format!(
            "{}/gradio_api/call/{ENDPOINT}/{}",
            self.base_url, event.event_id
        );
        let deadline = Instant::now() + self.timeout;

        loop {
            thread::sleep(POLL_INTERVAL);

            let body = self
                .client
                .get(&poll_url)
                .send()
                .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?
                .text()
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

            if let Some(audio_url) = parse_completed_event(&body)? {
                return self.download_audio(&audio_url);
            }

            if Instant::now() >= deadline {
                return Err(BackendError::RequestFailed(
                    "Generation timed out".to_string(),
                ));
            }
        }
    }

    /// Download audio from URL.
    fn download_audio(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "Download failed: {}",
                response.status()
            )));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

/// Inspect one SSE poll body.
///
/// Returns the audio URL once the `complete` event arrived, `None` while the
/// job is still running.
pub(crate) fn parse_completed_event(body: &str) -> Result<Option<String>, BackendError> {
    if body.contains("event: error") {
        return Err(BackendError::BackendError("Generation failed".to_string()));
    }

    if !body.contains("event: complete") {
        return Ok(None);
    }

    for line in body.lines() {
        if let Some(data) = line.strip_prefix("data: ") {
            let parsed: serde_json::Value = serde_json::from_str(data)
                .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

            if let Some(url) = parsed
                .as_array()
                .and_then(|a| a.first())
                .and_then(|v| v.get("url"))
                .and_then(|u| u.as_str())
            {
                return Ok(Some(url.to_string()));
            }
        }
    }

    Err(BackendError::InvalidResponse(
        "No audio URL in response".to_string(),
    ))
}

impl Backend for F5Backend {
    fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = format!("{}/config", self.base_url);
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

        Ok(HealthResponse {
            status: "healthy".to_string(),
            model: NAME.to_string(),
            cuda_available: false,
            gpu: None,
            device: String::new(),
        })
    }

    fn synthesize(
        &self,
        voice: &ReferenceVoice,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<SynthesizedAudio, BackendError> {
        let audio = voice
            .audio
            .as_deref()
            .ok_or(BackendError::MissingReference(NAME))?;

        let server_path = self.upload(audio)?;
        let wav = self.generate(&server_path, &voice.transcript, text, options)?;

        Ok(SynthesizedAudio::Wav(wav))
    }
}
