use crate::core::config::Config;
use crate::core::story::{CharacterField, Gender, Language, StoryParams, GENRES};
use anyhow::Result;
use inquire::{Confirm, Select, Text};
use std::fmt;

pub enum FormOutcome {
    Generate,
    Quit,
}

#[derive(Clone, Copy)]
enum FormAction {
    Header,
    Characters,
    Genres,
    Theme,
    ParallelScene,
    Language,
    Example,
    Generate,
    Quit,
}

impl fmt::Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormAction::Header => "Edit title & chapter",
            FormAction::Characters => "Characters & settings",
            FormAction::Genres => "Genres",
            FormAction::Theme => "Theme",
            FormAction::ParallelScene => "Parallel scene (meanwhile...)",
            FormAction::Language => "Language",
            FormAction::Example => "Fill with an example",
            FormAction::Generate => "Generate plot & story",
            FormAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

fn summary(params: &StoryParams) -> String {
    let names: Vec<&str> = params
        .characters
        .iter()
        .map(|c| if c.is_named() { c.name.as_str() } else { "(unnamed)" })
        .collect();
    format!(
        "\n{} · Chapter {}: {}\nCharacters: {}\nGenres: {}\nTheme: {}\nLanguage: {}\n",
        if params.main_title.is_empty() { "(untitled)" } else { params.main_title.as_str() },
        params.chapter_number,
        params.chapter_title,
        names.join(", "),
        params.genres.join(", "),
        params.theme,
        params.language,
    )
}

fn ask(label: &str, current: &str) -> Result<String> {
    Ok(Text::new(label).with_initial_value(current).prompt()?)
}

/// Runs the story form until the user generates or quits.
pub fn edit_params(params: &mut StoryParams, config: &mut Config) -> Result<FormOutcome> {
    loop {
        println!("{}", summary(params));
        let actions = vec![
            FormAction::Generate,
            FormAction::Header,
            FormAction::Characters,
            FormAction::Genres,
            FormAction::Theme,
            FormAction::ParallelScene,
            FormAction::Language,
            FormAction::Example,
            FormAction::Quit,
        ];

        match Select::new("Story form:", actions).prompt()? {
            FormAction::Generate => return Ok(FormOutcome::Generate),
            FormAction::Quit => return Ok(FormOutcome::Quit),
            FormAction::Header => {
                params.main_title = ask("Main story title:", &params.main_title)?;
                params.chapter_number = ask("Chapter number:", &params.chapter_number)?;
                params.chapter_title = ask("Chapter title:", &params.chapter_title)?;
            }
            FormAction::Characters => edit_characters(params)?,
            FormAction::Genres => edit_genres(params)?,
            FormAction::Theme => {
                params.theme = ask("Theme / topic:", &params.theme)?;
            }
            FormAction::ParallelScene => {
                let current = params.parallel_scene.clone().unwrap_or_default();
                let scene = ask("Meanwhile, elsewhere (optional):", &current)?;
                params.parallel_scene = Some(scene).filter(|s| !s.trim().is_empty());
            }
            FormAction::Language => {
                let language = Select::new("Language:", vec![Language::Id, Language::En]).prompt()?;
                params.language = language;
                if config.language != language
                    && Confirm::new("Use this language by default?")
                        .with_default(false)
                        .prompt()?
                {
                    config.language = language;
                    config.save()?;
                    println!("Configuration saved.");
                }
            }
            FormAction::Example => {
                *params = StoryParams::example(&mut rand::rng(), params.language);
            }
        }
    }
}

fn edit_characters(params: &mut StoryParams) -> Result<()> {
    const ADD: &str = "+ Add character";
    const BACK: &str = "< Back";

    loop {
        let mut options: Vec<String> = params
            .characters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let name = if c.is_named() { c.name.as_str() } else { "(unnamed)" };
                format!("{}. {} ({})", i + 1, name, c.role)
            })
            .collect();
        options.push(ADD.to_string());
        options.push(BACK.to_string());

        let choice = Select::new("Characters:", options).raw_prompt()?;
        let count = params.characters.len();
        if choice.index == count {
            let id = params.add_character().id.clone();
            edit_character(params, &id)?;
        } else if choice.index == count + 1 {
            return Ok(());
        } else {
            let id = params.characters[choice.index].id.clone();
            edit_character(params, &id)?;
        }
    }
}

fn edit_character(params: &mut StoryParams, id: &str) -> Result<()> {
    const GENDER: &str = "Gender";
    const REMOVE: &str = "Remove character";
    const BACK: &str = "< Back";

    loop {
        let Some(character) = params.characters.iter().find(|c| c.id == id) else {
            return Ok(());
        };

        let mut options: Vec<String> = CharacterField::ALL
            .iter()
            .map(|f| format!("{}: {}", f.label(), f.get(character)))
            .collect();
        options.push(format!("{}: {}", GENDER, character.gender));
        options.push(REMOVE.to_string());
        options.push(BACK.to_string());

        let choice = Select::new("Edit character:", options).raw_prompt()?;
        let fields = CharacterField::ALL.len();
        if choice.index < fields {
            let field = CharacterField::ALL[choice.index];
            let value = ask(&format!("{}:", field.label()), field.get(character))?;
            params.update_character(id, field, &value);
        } else if choice.index == fields {
            let gender = Select::new("Gender:", vec![Gender::Male, Gender::Female]).prompt()?;
            params.set_gender(id, gender);
        } else if choice.index == fields + 1 {
            if params.remove_character(id) {
                return Ok(());
            }
            println!("A story needs at least one character.");
        } else {
            return Ok(());
        }
    }
}

fn edit_genres(params: &mut StoryParams) -> Result<()> {
    const DONE: &str = "< Done";

    loop {
        let mut options: Vec<String> = GENRES
            .iter()
            .map(|g| {
                let mark = if params.genres.iter().any(|s| s == g) { "x" } else { " " };
                format!("[{}] {}", mark, g)
            })
            .collect();
        options.push(DONE.to_string());

        let choice = Select::new("Toggle genres:", options).raw_prompt()?;
        match GENRES.get(choice.index) {
            Some(genre) => params.toggle_genre(genre),
            None => return Ok(()),
        }
    }
}
