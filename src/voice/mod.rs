//! Reference voice resolution.
//!
//! Each emotion category is synthesized with one reference voice, chosen by
//! walking a priority-ordered chain of strategies: the emotion's own
//! reference, then a shared default, then (optionally) no reference at all.

mod resolver;

pub use resolver::{
    DefaultReference, EmotionReference, F5_DEFAULT_AUDIO, F5_DEFAULT_TRANSCRIPT, ReferenceResolver,
    ReferenceSource, ReferenceVoice, ResolverChain, Unconditioned, VoiceError,
};
