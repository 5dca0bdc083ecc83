//! CLI argument parsing and validation.

mod args;

pub use args::{
    Args, BackendKind, DEFAULT_EMOTIONS, Reference, ReferenceParseError, parse_emotion,
};

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    // ===========================================
    // Reference::parse tests
    // ===========================================

    #[test]
    fn test_parse_reference_valid() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        let input = format!("{path};Some call me nature");

        let reference = Reference::parse(&input).unwrap();

        assert_eq!(reference.transcript, "Some call me nature");
        assert_eq!(reference.audio_path, PathBuf::from(path));
    }

    #[test]
    fn test_parse_reference_missing_semicolon() {
        let result = Reference::parse("audio.wav no semicolon here");

        assert!(matches!(
            result.unwrap_err(),
            ReferenceParseError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_parse_reference_empty_transcript() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let result = Reference::parse(&format!("{path};  "));

        assert!(matches!(
            result.unwrap_err(),
            ReferenceParseError::EmptyTranscript
        ));
    }

    #[test]
    fn test_parse_reference_file_not_found() {
        let result = Reference::parse("/nonexistent/path/audio.wav;Hello world");

        assert!(matches!(
            result.unwrap_err(),
            ReferenceParseError::FileNotFound(_)
        ));
    }

    #[test]
    fn test_parse_reference_preserves_semicolons_in_transcript() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        let input = format!("  {path}  ;Hello; world; with; semicolons  ");

        let reference = Reference::parse(&input).unwrap();
        assert_eq!(reference.transcript, "Hello; world; with; semicolons");
    }

    // ===========================================
    // Emotion validation tests
    // ===========================================

    #[test]
    fn test_parse_emotion_trims() {
        assert_eq!(parse_emotion(" happy ").unwrap(), "happy");
    }

    #[test]
    fn test_parse_emotion_rejects_traversal() {
        assert!(parse_emotion("../etc").is_err());
        assert!(parse_emotion("a/b").is_err());
        assert!(parse_emotion("a\\b").is_err());
        assert!(parse_emotion("").is_err());
        assert!(parse_emotion(".").is_err());
        assert!(parse_emotion(" . ").is_err());
    }

    // ===========================================
    // BackendKind tests
    // ===========================================

    #[test]
    fn test_backend_default_is_f5() {
        assert_eq!(BackendKind::default(), BackendKind::F5);
    }

    #[test]
    fn test_backend_identifiers() {
        assert_eq!(BackendKind::F5.as_str(), "f5");
        assert_eq!(BackendKind::Tortoise.as_str(), "tortoise");
        assert_eq!(BackendKind::F5.model_dir_name(), "F5-TTS");
        assert_eq!(BackendKind::Tortoise.model_dir_name(), "tortoise-tts");
    }

    #[test]
    fn test_backend_ports() {
        assert_eq!(BackendKind::F5.port(), 7860);
        assert_eq!(BackendKind::Tortoise.port(), 9290);
    }

    // ===========================================
    // Args parsing tests
    // ===========================================

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["emotion-tts-batch"]).unwrap();

        assert_eq!(args.backend, BackendKind::F5);
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.emotions, DEFAULT_EMOTIONS.to_vec());
        assert_eq!(args.backend_port(), 7860);
        assert!(!args.allow_unconditioned);
        assert!(!args.show_progress);
        assert!(args.report.is_none());
    }

    #[test]
    fn test_args_emotion_list() {
        let args = Args::try_parse_from([
            "emotion-tts-batch",
            "--backend",
            "tortoise",
            "--emotions",
            "happy,sad",
            "--port",
            "8000",
        ])
        .unwrap();

        assert_eq!(args.backend, BackendKind::Tortoise);
        assert_eq!(args.emotions, vec!["happy", "sad"]);
        assert_eq!(args.backend_port(), 8000);
    }

    #[test]
    fn test_args_rejects_bad_emotion() {
        let result = Args::try_parse_from(["emotion-tts-batch", "--emotions", "happy,../x"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["emotion-tts-batch", "--emotions", "happy,."]);
        assert!(result.is_err());
    }
}
