pub mod form;
pub mod view;

use crate::core::config::Config;
use crate::core::error::StoryError;
use crate::core::state::{Stage, StoryState};
use crate::core::story::StoryParams;
use crate::services::pipeline::StoryPipeline;
use crate::services::playback::{AudioOutput, PlaybackController};
use anyhow::Result;
use form::FormOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Select;
use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy)]
enum ResultAction {
    TogglePlayback(&'static str),
    Replay,
    NewStory,
    EditAgain,
    Quit,
}

impl fmt::Display for ResultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultAction::TogglePlayback(label) => f.write_str(label),
            ResultAction::Replay => f.write_str("Replay from the start"),
            ResultAction::NewStory => f.write_str("New story"),
            ResultAction::EditAgain => f.write_str("Edit these details"),
            ResultAction::Quit => f.write_str("Quit"),
        }
    }
}

enum Next {
    Form,
    Quit,
}

/// Terminal front-end: story form, progress, result and narration.
pub struct App<O: AudioOutput> {
    config: Config,
    pipeline: StoryPipeline,
    output: O,
    params: StoryParams,
    state: StoryState,
}

impl<O: AudioOutput> App<O> {
    pub fn new(config: Config, pipeline: StoryPipeline, output: O) -> Self {
        let params = StoryParams {
            language: config.language,
            ..StoryParams::default()
        };
        Self {
            config,
            pipeline,
            output,
            params,
            state: StoryState::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            if let StoryState::Failed(message) = &self.state {
                println!("\n⚠ {}", message);
            }

            match form::edit_params(&mut self.params, &mut self.config)? {
                FormOutcome::Quit => return Ok(()),
                FormOutcome::Generate => {}
            }

            self.generate().await;

            if self.state.result().is_some() {
                match self.show_result()? {
                    Next::Form => continue,
                    Next::Quit => return Ok(()),
                }
            }
        }
    }

    async fn generate(&mut self) {
        let language = self.params.language;
        if let Err(e) = self.params.validate() {
            log::info!("Story form incomplete: {}", e);
            self.state.fail(StoryError::from(e).user_message(language));
            return;
        }

        self.state.begin();
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.magenta} {msg}") {
            pb.set_style(style);
        }

        let state = &mut self.state;
        let outcome = self
            .pipeline
            .generate(&self.params, |stage| {
                state.advance(stage);
                if stage != Stage::Idle {
                    pb.set_message(format!(
                        "{} ({}%)",
                        view::stage_label(stage, language),
                        view::stage_percent(stage)
                    ));
                }
            })
            .await;
        pb.finish_and_clear();

        match outcome {
            Ok(result) => self.state.complete(result),
            Err(e) => {
                log::error!("Story generation failed: {}", e);
                self.state.fail(e.user_message(language));
            }
        }
    }

    /// Shows the finished story. The playback controller lives exactly as
    /// long as this view.
    fn show_result(&mut self) -> Result<Next> {
        let Some(result) = self.state.result().cloned() else {
            return Ok(Next::Form);
        };
        let language = self.params.language;
        println!("\n{}\n", view::render_result(&result, language));

        let mut player = PlaybackController::new(&mut self.output);
        let audio = result.audio.as_ready();

        if let (Some(buffer), true) = (audio, self.config.audio.autoplay) {
            if let Err(e) = player.play(buffer) {
                println!("{}", e);
            }
        }

        let next = loop {
            let mut actions = Vec::new();
            if audio.is_some() {
                actions.push(ResultAction::TogglePlayback(view::playback_label(
                    player.state(),
                    language,
                )));
                actions.push(ResultAction::Replay);
            }
            actions.push(ResultAction::NewStory);
            actions.push(ResultAction::EditAgain);
            actions.push(ResultAction::Quit);

            let choice = match Select::new("What next?", actions).prompt() {
                Ok(choice) => choice,
                Err(e) => break Err(e.into()),
            };

            match (choice, audio) {
                (ResultAction::TogglePlayback(_), Some(buffer)) => {
                    if player.is_playing() {
                        player.stop();
                    } else if let Err(e) = player.play(buffer) {
                        println!("{}", e);
                    }
                }
                (ResultAction::Replay, Some(buffer)) => {
                    if let Err(e) = player.play(buffer) {
                        println!("{}", e);
                    }
                }
                (ResultAction::NewStory, _) => {
                    self.params = StoryParams {
                        language,
                        ..StoryParams::default()
                    };
                    break Ok(Next::Form);
                }
                (ResultAction::EditAgain, _) => break Ok(Next::Form),
                (ResultAction::Quit, _) => break Ok(Next::Quit),
                _ => {}
            }
        };

        drop(player);
        self.state.reset();
        next
    }
}
