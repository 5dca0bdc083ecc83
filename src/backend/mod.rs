//! Backend communication with TTS model servers.
//!
//! Provides the synthesis capability trait and its adapters for the
//! F5-TTS Gradio app and the Tortoise-TTS inference server.

mod f5;
mod tortoise;
mod types;

use std::time::Duration;

pub use f5::F5Backend;
pub use tortoise::{TORTOISE_SAMPLE_RATE, TortoiseBackend};
pub use types::{BackendError, HealthResponse, SynthesisOptions, SynthesizedAudio};

use crate::cli::BackendKind;
use crate::voice::ReferenceVoice;

/// Trait for TTS backend communication.
///
/// This trait abstracts the HTTP communication with the TTS servers,
/// allowing for mock implementations in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// Check backend health status.
    fn health(&self) -> Result<HealthResponse, BackendError>;

    /// Synthesize `text` in the given reference voice.
    ///
    /// Nothing is written to disk; persisting the result is up to the caller.
    fn synthesize(
        &self,
        voice: &ReferenceVoice,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<SynthesizedAudio, BackendError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn health(&self) -> Result<HealthResponse, BackendError> {
        (**self).health()
    }

    fn synthesize(
        &self,
        voice: &ReferenceVoice,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<SynthesizedAudio, BackendError> {
        (**self).synthesize(voice, text, options)
    }
}

/// Create a backend for the specified engine.
pub fn create_backend(
    kind: BackendKind,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<Box<dyn Backend>, BackendError> {
    let backend: Box<dyn Backend> = match kind {
        BackendKind::F5 => Box::new(F5Backend::new(host, port, timeout)?),
        BackendKind::Tortoise => Box::new(TortoiseBackend::new(host, port, timeout)?),
    };
    Ok(backend)
}

/// Blocking client whose per-request timeout is `timeout`.
fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, BackendError> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::ClientSetup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::ReferenceSource;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread;
    use std::time::Instant;

    /// Accept one connection and answer it only after `delay`.
    fn slow_server(delay: Duration, body: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                thread::sleep(delay);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        port
    }

    fn happy_voice() -> ReferenceVoice {
        ReferenceVoice {
            audio: Some(PathBuf::from("/refs/happy_ref.wav")),
            transcript: "I feel great".to_string(),
            source: ReferenceSource::Emotion,
        }
    }

    // ===========================================
    // Backend trait tests with mocks
    // ===========================================

    #[test]
    fn test_mock_backend_health_success() {
        let mut mock = MockBackend::new();

        mock.expect_health().times(1).returning(|| {
            Ok(HealthResponse {
                status: "healthy".to_string(),
                model: "tortoise".to_string(),
                cuda_available: true,
                gpu: Some("NVIDIA RTX 5060".to_string()),
                device: "cuda:0".to_string(),
            })
        });

        let health = mock.health().unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.cuda_available);
    }

    #[test]
    fn test_mock_backend_health_failure() {
        let mut mock = MockBackend::new();

        mock.expect_health().times(1).returning(|| {
            Err(BackendError::ConnectionFailed(
                "Connection refused".to_string(),
            ))
        });

        assert!(matches!(
            mock.health().unwrap_err(),
            BackendError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let mut mock = MockBackend::new();

        mock.expect_synthesize()
            .withf(|voice, text, options| {
                voice.transcript == "I feel great" && text == "Hello" && !options.show_progress
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(SynthesizedAudio::Samples {
                    samples: vec![0.0, 0.5],
                    sample_rate: TORTOISE_SAMPLE_RATE,
                })
            });

        let backend: Box<dyn Backend> = Box::new(mock);
        let audio = backend
            .synthesize(&happy_voice(), "Hello", &SynthesisOptions::default())
            .unwrap();

        assert!(matches!(
            audio,
            SynthesizedAudio::Samples { sample_rate: 24_000, .. }
        ));
    }

    // ===========================================
    // Backend construction tests
    // ===========================================

    #[test]
    fn test_create_f5_backend_url() {
        let backend =
            F5Backend::new("localhost", BackendKind::F5.port(), Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:7860");
    }

    #[test]
    fn test_create_tortoise_backend_url() {
        let backend = TortoiseBackend::new("gpu-box", 9290, Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://gpu-box:9290");
    }

    #[test]
    fn test_f5_requires_reference_audio() {
        let backend = F5Backend::new("localhost", 7860, Duration::from_secs(1)).unwrap();
        let voice = ReferenceVoice {
            audio: None,
            transcript: String::new(),
            source: ReferenceSource::Unconditioned,
        };

        let result = backend.synthesize(&voice, "Hello", &SynthesisOptions::default());
        assert!(matches!(
            result.unwrap_err(),
            BackendError::MissingReference("F5-TTS")
        ));
    }

    #[test]
    fn test_create_backend_for_each_kind() {
        for kind in [BackendKind::F5, BackendKind::Tortoise] {
            assert!(create_backend(kind, "localhost", kind.port(), Duration::from_secs(1)).is_ok());
        }
    }

    // ===========================================
    // Request timeout tests
    // ===========================================

    #[test]
    fn test_f5_health_honours_timeout() {
        let port = slow_server(Duration::from_secs(4), "{}");
        let backend = create_backend(BackendKind::F5, "127.0.0.1", port, Duration::from_secs(1))
            .unwrap();

        let start = Instant::now();
        let result = backend.health();

        assert!(matches!(result, Err(BackendError::ConnectionFailed(_))));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_tortoise_health_honours_timeout() {
        let port = slow_server(
            Duration::from_secs(4),
            r#"{"status": "healthy", "model": "tortoise"}"#,
        );
        let backend =
            create_backend(BackendKind::Tortoise, "127.0.0.1", port, Duration::from_secs(1))
                .unwrap();

        let start = Instant::now();
        let result = backend.health();

        assert!(matches!(result, Err(BackendError::ConnectionFailed(_))));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_tortoise_health_within_timeout() {
        let port = slow_server(
            Duration::from_millis(100),
            r#"{"status": "healthy", "model": "tortoise"}"#,
        );
        let backend =
            create_backend(BackendKind::Tortoise, "127.0.0.1", port, Duration::from_secs(5))
                .unwrap();

        assert_eq!(backend.health().unwrap().status, "healthy");
    }

    // ===========================================
    // Wire format tests
    // ===========================================

    #[test]
    fn test_sse_pending() {
        let body = "event: generating\ndata: null\n\n";
        assert_eq!(f5::parse_completed_event(body).unwrap(), None);
    }

    #[test]
    fn test_sse_complete_with_audio_url() {
        let body = "event: complete\ndata: [{\"path\": \"/tmp/a.wav\", \"url\": \"http://localhost:7860/file=/tmp/a.wav\"}, null, \"ref\", 7]\n\n";
        assert_eq!(
            f5::parse_completed_event(body).unwrap(),
            Some("http://localhost:7860/file=/tmp/a.wav".to_string())
        );
    }

    #[test]
    fn test_sse_error_event() {
        let body = "event: error\ndata: null\n\n";
        assert!(matches!(
            f5::parse_completed_event(body).unwrap_err(),
            BackendError::BackendError(_)
        ));
    }

    #[test]
    fn test_sse_complete_without_url() {
        let body = "event: complete\ndata: [null]\n\n";
        assert!(matches!(
            f5::parse_completed_event(body).unwrap_err(),
            BackendError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_decode_f32le_samples() {
        let mut bytes = Vec::new();
        for sample in [0.25f32, -1.0, 0.5] {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        assert_eq!(tortoise::decode_f32le(&bytes).unwrap(), vec![0.25, -1.0, 0.5]);
    }

    #[test]
    fn test_decode_f32le_rejects_truncated_body() {
        assert!(tortoise::decode_f32le(&[0, 0, 128]).is_err());
    }
}
