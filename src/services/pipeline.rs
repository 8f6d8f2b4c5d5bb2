use crate::core::error::{GenerationError, GenerationStage, StoryError};
use crate::core::state::{Artifact, PipelineResult, SkipReason, Stage, StoryImage};
use crate::core::story::{GeneratedStory, StoryParams};
use crate::services::gemini::GenerationClient;
use crate::utils::audio::{decode_pcm, AudioBuffer};
use log::{info, warn};

/// Runs text, image and speech generation one after another.
///
/// Only the text stage is mandatory. Image and speech failures leave the
/// corresponding artifact missing and the run carries on.
pub struct StoryPipeline {
    client: Box<dyn GenerationClient>,
    sample_rate: u32,
}

impl StoryPipeline {
    pub fn new(client: Box<dyn GenerationClient>, sample_rate: u32) -> Self {
        Self {
            client,
            sample_rate,
        }
    }

    /// Generates a complete story. `on_stage` sees every stage marker as
    /// the run reaches it, ending with `Stage::Idle` on success.
    pub async fn generate<F>(
        &self,
        params: &StoryParams,
        mut on_stage: F,
    ) -> Result<PipelineResult, StoryError>
    where
        F: FnMut(Stage),
    {
        params.validate()?;

        on_stage(Stage::Writing);
        let story = self.write(params).await?;
        info!("Story written: {}", story.title);

        on_stage(Stage::Drawing);
        let image = self.draw(&story, params).await;

        on_stage(Stage::Narrating);
        let audio = self.narrate(&story, params).await;

        on_stage(Stage::Idle);
        Ok(PipelineResult {
            story,
            image,
            audio,
        })
    }

    async fn write(&self, params: &StoryParams) -> Result<GeneratedStory, StoryError> {
        self.client
            .generate_text(params)
            .await
            .map_err(|e| GenerationError::new(GenerationStage::Text, e).into())
    }

    async fn draw(&self, story: &GeneratedStory, params: &StoryParams) -> Artifact<StoryImage> {
        match self.client.generate_image(story, params).await {
            Ok(image) => {
                if image.is_none() {
                    warn!("Image generation returned no image");
                }
                image.into()
            }
            Err(e) => {
                let err = GenerationError::new(GenerationStage::Image, e);
                warn!("{}", err);
                Artifact::Missing(SkipReason::Failed(format!("{:#}", err.source)))
            }
        }
    }

    async fn narrate(&self, story: &GeneratedStory, params: &StoryParams) -> Artifact<AudioBuffer> {
        let payload = match self
            .client
            .generate_speech(&story.content, params.language)
            .await
        {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                warn!("Speech generation returned no audio");
                return Artifact::Missing(SkipReason::NotReturned);
            }
            Err(e) => {
                let err = GenerationError::new(GenerationStage::Speech, e);
                warn!("{}", err);
                return Artifact::Missing(SkipReason::Failed(format!("{:#}", err.source)));
            }
        };

        match decode_pcm(&payload, self.sample_rate) {
            Ok(buffer) => {
                info!("Narration ready ({:.1}s)", buffer.duration().as_secs_f32());
                Artifact::Ready(buffer)
            }
            Err(e) => {
                warn!("Narration audio could not be decoded: {}", e);
                Artifact::Missing(SkipReason::Undecodable(e.to_string()))
            }
        }
    }
}
