//! Audio persistence for synthesized results.

mod wav;

pub use wav::{
    AudioError, encode_wav_mono, f32_to_pcm16, save, to_wav_bytes, validate_wav, write_atomic,
};
