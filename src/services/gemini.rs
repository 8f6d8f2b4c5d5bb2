use crate::core::config::GeminiConfig;
use crate::core::state::StoryImage;
use crate::core::story::{GeneratedStory, Language, StoryParams};
use crate::services::prompt::{image_prompt, speech_prompt, story_prompt, strip_code_blocks};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Debug;
use url::Url;

/// The three operations of the generative service.
#[async_trait]
pub trait GenerationClient: Send + Sync + Debug {
    async fn generate_text(&self, params: &StoryParams) -> Result<GeneratedStory>;

    /// `Ok(None)` when the service answered without an image.
    async fn generate_image(
        &self,
        story: &GeneratedStory,
        params: &StoryParams,
    ) -> Result<Option<StoryImage>>;

    /// Base64 raw PCM, `Ok(None)` when the answer carried no audio.
    async fn generate_speech(&self, text: &str, language: Language) -> Result<Option<String>>;
}

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    base_url: Url,
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: &str, config: GeminiConfig) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'.
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base)
            .with_context(|| format!("Invalid Gemini base URL: {}", config.base_url))?;
        Ok(Self {
            api_key: api_key.to_string(),
            base_url,
            config,
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, model: &str) -> Result<Url> {
        self.base_url
            .join(&format!("models/{}:generateContent", model))
            .with_context(|| format!("Invalid model name: {}", model))
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse> {
        let url = self.endpoint(model)?;
        debug!("POST {}", url);

        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await?;
            return Err(anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        let response_text = resp.text().await?;
        parse_response(&response_text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

impl GeminiRequest {
    fn prompt(text: String) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text }],
            }],
            generation_config: None,
        }
    }

    fn with_config(mut self, config: Value) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize, Debug)]
struct GeminiPartResponse {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize, Debug)]
struct InlineData {
    #[serde(rename = "mimeType", default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

fn parse_response(body: &str) -> Result<GeminiResponse> {
    let result: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("Failed to parse Gemini response: {}. Body: {}", e, body))?;
    if let Some(err) = &result.error {
        return Err(anyhow!("Gemini API returned error: {}", err.message));
    }
    Ok(result)
}

impl GeminiResponse {
    /// Parts of the first candidate. A candidate without content is an error
    /// carrying the finish reason.
    fn first_parts(&self) -> Result<&[GeminiPartResponse]> {
        let first = self
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .ok_or_else(|| anyhow!("Gemini response has no candidates"))?;

        match &first.content {
            Some(content) if !content.parts.is_empty() => Ok(&content.parts),
            _ => {
                let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
                Err(anyhow!("Gemini response empty. Finish reason: {}", reason))
            }
        }
    }

    fn text(&self) -> Result<String> {
        let text: String = self
            .first_parts()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            return Err(anyhow!("No text generated"));
        }
        Ok(text)
    }

    fn first_image(&self) -> Result<Option<StoryImage>> {
        Ok(self
            .first_parts()?
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| StoryImage {
                mime_type: d.mime_type.clone(),
                data: d.data.clone(),
            }))
    }

    fn leading_audio(&self) -> Result<Option<String>> {
        Ok(self
            .first_parts()?
            .first()
            .and_then(|p| p.inline_data.as_ref())
            .map(|d| d.data.clone())
            .filter(|d| !d.is_empty()))
    }
}

fn parse_story(text: &str) -> Result<GeneratedStory> {
    let clean_json = strip_code_blocks(text);
    let story: GeneratedStory = serde_json::from_str(&clean_json)
        .with_context(|| format!("Failed to parse story JSON: {}", clean_json))?;
    if story.content.trim().is_empty() {
        return Err(anyhow!("Generated story has no content"));
    }
    Ok(story)
}

fn story_generation_config() -> Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING", "description": "The creative title of this specific chapter/story" },
                "content": { "type": "STRING", "description": "The full body of the story" },
                "moral": { "type": "STRING", "description": "A short moral lesson from the story" }
            },
            "required": ["title", "content", "moral"]
        }
    })
}

fn speech_generation_config(voice: &str) -> Value {
    json!({
        "responseModalities": ["AUDIO"],
        "speechConfig": {
            "voiceConfig": {
                "prebuiltVoiceConfig": { "voiceName": voice }
            }
        }
    })
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate_text(&self, params: &StoryParams) -> Result<GeneratedStory> {
        let request =
            GeminiRequest::prompt(story_prompt(params)).with_config(story_generation_config());
        let response = self
            .generate_content(&self.config.text_model, &request)
            .await?;
        parse_story(&response.text()?)
    }

    async fn generate_image(
        &self,
        story: &GeneratedStory,
        params: &StoryParams,
    ) -> Result<Option<StoryImage>> {
        let request = GeminiRequest::prompt(image_prompt(story, params));
        let response = self
            .generate_content(&self.config.image_model, &request)
            .await?;
        response.first_image()
    }

    async fn generate_speech(&self, text: &str, language: Language) -> Result<Option<String>> {
        let request = GeminiRequest::prompt(speech_prompt(text, language))
            .with_config(speech_generation_config(&self.config.voice));
        let response = self
            .generate_content(&self.config.speech_model, &request)
            .await?;
        response.leading_audio()
    }
}
