use crate::core::story::Language;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one character needs a name")]
    NoNamedCharacter,
    #[error("a theme is required")]
    MissingTheme,
    #[error("select at least one genre")]
    NoGenre,
}

/// External operation a generation failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Text,
    Image,
    Speech,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStage::Text => f.write_str("text"),
            GenerationStage::Image => f.write_str("image"),
            GenerationStage::Speech => f.write_str("speech"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{stage} generation failed: {source:#}")]
pub struct GenerationError {
    pub stage: GenerationStage,
    #[source]
    pub source: anyhow::Error,
}

impl GenerationError {
    pub fn new(stage: GenerationStage, source: anyhow::Error) -> Self {
        Self { stage, source }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio payload is empty")]
    Empty,
    #[error("audio payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("audio payload has {0} bytes, not a whole number of 16-bit frames")]
    PartialFrame(usize),
    #[error("sample rate must be above 0 Hz")]
    ZeroSampleRate,
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio output could not be resumed: {0}")]
    OutputUnavailable(String),
    #[error("playback could not start: {0}")]
    Start(String),
}

/// Outcomes that abort a generation run.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("invalid story parameters: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl StoryError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self, language: Language) -> &'static str {
        match (self, language) {
            (StoryError::Validation(_), Language::Id) => {
                "Mohon lengkapi detail inti cerita (Minimal 1 Karakter, Tema, dan 1 Genre)."
            }
            (StoryError::Validation(_), Language::En) => {
                "Please complete the core story details (at least 1 character, a theme and 1 genre)."
            }
            (StoryError::Generation(_), Language::Id) => {
                "Maaf, terjadi kesalahan saat membuat cerita. Silakan coba lagi."
            }
            (StoryError::Generation(_), Language::En) => {
                "Sorry, something went wrong while creating the story. Please try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_message_includes_stage_and_cause() {
        let err = GenerationError::new(GenerationStage::Text, anyhow::anyhow!("quota exceeded"));
        assert_eq!(err.to_string(), "text generation failed: quota exceeded");
    }

    #[test]
    fn test_user_message_is_generic() {
        let err: StoryError =
            GenerationError::new(GenerationStage::Text, anyhow::anyhow!("HTTP 500 body")).into();
        let msg = err.user_message(Language::En);
        assert!(!msg.contains("500"));
        assert!(StoryError::from(ValidationError::NoGenre)
            .user_message(Language::Id)
            .starts_with("Mohon"));
    }
}
