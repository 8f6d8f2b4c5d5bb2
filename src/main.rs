use anyhow::Result;
use storyforge::core::config::Config;
use storyforge::services::gemini::GeminiClient;
use storyforge::services::pipeline::StoryPipeline;
use storyforge::services::playback::RodioOutput;
use storyforge::ui::App;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please fix or remove 'config.yml'.");
            return Err(e);
        }
    };

    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Set gemini.api_key in 'config.yml' or export GEMINI_API_KEY.");
            return Err(e);
        }
    };

    let client = GeminiClient::new(&api_key, config.gemini.clone())?;
    let pipeline = StoryPipeline::new(Box::new(client), config.audio.sample_rate);

    let mut app = App::new(config, pipeline, RodioOutput::new());
    app.run().await
}
