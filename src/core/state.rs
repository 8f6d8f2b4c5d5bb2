use crate::core::story::GeneratedStory;
use crate::utils::audio::AudioBuffer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Progress marker of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Writing,
    Drawing,
    Narrating,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => f.write_str("idle"),
            Stage::Writing => f.write_str("writing"),
            Stage::Drawing => f.write_str("drawing"),
            Stage::Narrating => f.write_str("narrating"),
        }
    }
}

/// Why an optional artifact is absent from a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Failed(String),
    NotReturned,
    Undecodable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Failed(msg) => write!(f, "generation failed: {}", msg),
            SkipReason::NotReturned => f.write_str("service returned nothing"),
            SkipReason::Undecodable(msg) => write!(f, "payload could not be decoded: {}", msg),
        }
    }
}

/// Outcome of an optional pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact<T> {
    Ready(T),
    Missing(SkipReason),
}

impl<T> Artifact<T> {
    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Artifact::Ready(value) => Some(value),
            Artifact::Missing(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Artifact::Ready(_))
    }
}

impl<T> From<Option<T>> for Artifact<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Artifact::Ready(v),
            None => Artifact::Missing(SkipReason::NotReturned),
        }
    }
}

/// Inline illustration returned by the image stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryImage {
    pub mime_type: String,
    /// Base64 encoded image bytes.
    pub data: String,
}

impl StoryImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub story: GeneratedStory,
    pub image: Artifact<StoryImage>,
    pub audio: Artifact<AudioBuffer>,
}

/// What the front-end shows. Exactly one variant holds at a time.
#[derive(Debug, Clone, Default)]
pub enum StoryState {
    #[default]
    Idle,
    InProgress(Stage),
    Completed(Box<PipelineResult>),
    Failed(String),
}

impl StoryState {
    pub fn begin(&mut self) {
        *self = StoryState::InProgress(Stage::Writing);
    }

    /// Follows a stage marker. `Idle` is left to `complete`/`fail`.
    pub fn advance(&mut self, stage: Stage) {
        if let StoryState::InProgress(current) = self {
            if stage != Stage::Idle {
                *current = stage;
            }
        }
    }

    pub fn complete(&mut self, result: PipelineResult) {
        *self = StoryState::Completed(Box::new(result));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        *self = StoryState::Failed(message.into());
    }

    pub fn reset(&mut self) {
        *self = StoryState::Idle;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, StoryState::InProgress(_))
    }

    pub fn stage(&self) -> Stage {
        match self {
            StoryState::InProgress(stage) => *stage,
            _ => Stage::Idle,
        }
    }

    pub fn result(&self) -> Option<&PipelineResult> {
        match self {
            StoryState::Completed(result) => Some(result.as_ref()),
            _ => None,
        }
    }
}
