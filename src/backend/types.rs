//! Backend request/response types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when communicating with the backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Reference audio required by {0}")]
    MissingReference(&'static str),

    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Health check response from backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    #[serde(default)]
    pub cuda_available: bool,
    #[serde(default)]
    pub gpu: Option<String>,
    #[serde(default)]
    pub device: String,
}

/// Per-call knobs passed through to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Let the backend emit its own progress output.
    pub show_progress: bool,
    /// Fixed seed; `None` asks the backend to randomize.
    pub seed: Option<u64>,
    pub speed: f32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            show_progress: false,
            seed: None,
            speed: 1.0,
        }
    }
}

impl SynthesisOptions {
    /// Set the progress flag.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Set the generation seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the speech speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

/// Audio produced by one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesizedAudio {
    /// A complete WAV file.
    Wav(Vec<u8>),
    /// Mono samples in [-1.0, 1.0] that still need encoding.
    Samples { samples: Vec<f32>, sample_rate: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_options_builder() {
        let options = SynthesisOptions::default()
            .with_progress(true)
            .with_seed(Some(42))
            .with_speed(1.5);

        assert!(options.show_progress);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.speed, 1.5);
    }

    #[test]
    fn test_synthesis_options_defaults() {
        let options = SynthesisOptions::default();

        assert!(!options.show_progress);
        assert_eq!(options.seed, None);
        assert_eq!(options.speed, 1.0);
    }

    #[test]
    fn test_health_response_deserialize() {
        let json = r#"{
            "status": "healthy",
            "model": "tortoise",
            "cuda_available": true,
            "gpu": "NVIDIA RTX 5060",
            "device": "cuda:0"
        }"#;

        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "healthy");
        assert!(response.cuda_available);
        assert_eq!(response.gpu, Some("NVIDIA RTX 5060".to_string()));
    }

    #[test]
    fn test_health_response_minimal() {
        let json = r#"{"status": "ok", "model": "tortoise"}"#;

        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert!(!response.cuda_available);
        assert_eq!(response.gpu, None);
        assert_eq!(response.device, "");
    }
}
