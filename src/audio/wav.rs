//! WAV encoding and atomic persistence.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::backend::SynthesizedAudio;

/// Errors that can occur while turning synthesized audio into a file.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Invalid WAV data: {0}")]
    InvalidWav(#[from] hound::Error),

    #[error("Sample rate must be > 0")]
    ZeroSampleRate,

    #[error("Backend returned no audio")]
    Empty,

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Map float samples to signed 16-bit PCM.
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&x| {
            let x = if x.is_finite() { x.clamp(-1.0, 1.0) } else { 0.0 };
            // -1.0 -> -32768, +1.0 -> 32767
            if x >= 0.0 {
                (x * 32767.0).round() as i16
            } else {
                (x * 32768.0).round() as i16
            }
        })
        .collect()
}

/// Encode mono float samples as a 16-bit PCM WAV file.
pub fn encode_wav_mono(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    if sample_rate == 0 {
        return Err(AudioError::ZeroSampleRate);
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buf, spec)?;
        for sample in f32_to_pcm16(samples) {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(buf.into_inner())
}

/// Check that `bytes` parse as a WAV file; returns its spec.
pub fn validate_wav(bytes: &[u8]) -> Result<hound::WavSpec, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }

    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    Ok(reader.spec())
}

/// Turn backend output into the bytes of a WAV file.
pub fn to_wav_bytes(audio: SynthesizedAudio) -> Result<Vec<u8>, AudioError> {
    match audio {
        SynthesizedAudio::Wav(bytes) => {
            validate_wav(&bytes)?;
            Ok(bytes)
        }
        SynthesizedAudio::Samples {
            samples,
            sample_rate,
        } => {
            if samples.is_empty() {
                return Err(AudioError::Empty);
            }
            encode_wav_mono(&samples, sample_rate)
        }
    }
}

/// Replace `path` with `bytes` without ever exposing a partial file.
///
/// Parent directories are created on demand. The data goes to a temporary
/// file next to `path` which is then renamed over it.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AudioError> {
    let write_err = |source| AudioError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Encode and atomically persist backend output; returns bytes written.
pub fn save(path: &Path, audio: SynthesizedAudio) -> Result<usize, AudioError> {
    let bytes = to_wav_bytes(audio)?;
    write_atomic(path, &bytes)?;
    Ok(bytes.len())
}
