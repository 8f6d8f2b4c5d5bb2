use crate::core::story::{Character, GeneratedStory, Language, StoryParams};

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn describe_character(c: &Character) -> String {
    format!(
        "- Name: {name} ({gender}, {age} y.o)\n\
         \x20 Role: {role}\n\
         \x20 Traits: {traits}\n\n\
         \x20 LOCATION DETAILS for {name}:\n\
         \x20 - Environment: {env}\n\
         \x20 - Env. Description: {atmosphere}\n\
         \x20 - Specific Location: {location}\n\
         \x20 - Loc. Description: {visuals}",
        name = c.name,
        gender = c.gender,
        age = c.age,
        role = c.role,
        traits = c.description,
        env = or_default(&c.setting_environment, "Unknown"),
        atmosphere = or_default(&c.setting_atmosphere, "N/A"),
        location = or_default(&c.setting_location, "Default/Anywhere"),
        visuals = or_default(&c.setting_visuals, "N/A"),
    )
}

/// Prompt for the story text stage.
pub fn story_prompt(params: &StoryParams) -> String {
    let mut context = String::new();
    if !params.main_title.trim().is_empty() {
        context.push_str(&format!("Main Story Title: \"{}\".\n", params.main_title));
    }
    if !params.chapter_number.trim().is_empty() {
        context.push_str(&format!("Chapter Number: {}.\n", params.chapter_number));
    }
    if !params.chapter_title.trim().is_empty() {
        context.push_str(&format!("Chapter Title: \"{}\".\n", params.chapter_title));
    }

    let characters = if params.characters.is_empty() {
        "No specific characters provided.".to_string()
    } else {
        params
            .characters
            .iter()
            .map(describe_character)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let parallel = match params.parallel_scene() {
        Some(scene) => format!(
            "MEANWHILE / PARALLEL EVENTS:\n\
             While the main character's story is unfolding, the following is happening elsewhere:\n\
             \"{}\"\n\
             INSTRUCTION: You MUST weave this parallel event into the story. You can use a scene break (e.g., \"Sementara itu di tempat lain...\"), a flashback, or a shifting perspective to show this.\n",
            scene
        ),
        None => String::new(),
    };

    format!(
        "Create a short story chapter (approx 300-500 words).\n\
         Language: {language}.\n\n\
         Context:\n{context}\n\
         Characters & Their Settings:\n{characters}\n\n\
         {parallel}\n\
         Story Details:\n\
         Genre: {genres}.\n\
         Theme/Topic: {theme}.\n\n\
         Instructions:\n\
         1. STRICTLY use the provided \"Environment\" and \"Specific Location\" for each character to set the scene.\n\
         2. Incorporate the \"Env. Description\" and \"Loc. Description\" to make the setting vivid.\n\
         3. If characters are in different locations, you can cut between scenes or have them meet.\n\
         4. Ensure the tone matches the Genre.\n\
         5. The story must flow naturally between the main characters and the parallel events (if any).\n\n\
         Return the result strictly as JSON.",
        language = params.language.prompt_name(),
        context = context,
        characters = characters,
        parallel = parallel,
        genres = params.genres.join(", "),
        theme = params.theme,
    )
}

/// Prompt for the illustration, set in the first character's surroundings.
pub fn image_prompt(story: &GeneratedStory, params: &StoryParams) -> String {
    let setting = match params.primary_character() {
        Some(c) => format!(
            "Environment: {}. Atmosphere: {}. Location: {}. Visual Details: {}",
            c.setting_environment, c.setting_atmosphere, c.setting_location, c.setting_visuals
        ),
        None => "Fantasy world".to_string(),
    };

    format!(
        "A colorful, digital art style illustration.\n\
         Scene: {}.\n\
         Setting/Background: {}.\n\
         Genre vibe: {}.\n\
         High quality, vibrant colors, artistic, cinematic lighting.",
        story.title,
        setting,
        params.genres.join(", ")
    )
}

/// Narration instruction wrapped around the story body.
///
/// The language is not named: the voice follows the text itself.
pub fn speech_prompt(text: &str, _language: Language) -> String {
    format!(
        "Read this story with a warm, engaging, storytelling voice: \"{}\"",
        text
    )
}

/// Removes a surrounding markdown code fence from a model answer.
pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::story::Gender;

    fn params() -> StoryParams {
        let mut params = StoryParams::default();
        params.main_title = "Legenda".to_string();
        params.chapter_title = "Awal".to_string();
        params.theme = "honor".to_string();
        params.genres = vec!["Fantasi".to_string(), "Aksi".to_string()];
        let c = &mut params.characters[0];
        c.name = "Wei".to_string();
        c.gender = Gender::Male;
        c.age = "18".to_string();
        c.setting_location = "Puncak Batu Naga".to_string();
        params
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("json"), "json");
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  ```json  \n  {}  \n  ```  "), "{}");
    }

    #[test]
    fn test_story_prompt_contents() {
        let prompt = story_prompt(&params());
        assert!(prompt.contains("Language: Bahasa Indonesia."));
        assert!(prompt.contains("Main Story Title: \"Legenda\"."));
        assert!(prompt.contains("Chapter Number: 1."));
        assert!(prompt.contains("- Name: Wei (Laki-laki, 18 y.o)"));
        assert!(prompt.contains("- Specific Location: Puncak Batu Naga"));
        assert!(prompt.contains("- Environment: Unknown"));
        assert!(prompt.contains("Genre: Fantasi, Aksi."));
        assert!(prompt.contains("Theme/Topic: honor."));
        assert!(!prompt.contains("MEANWHILE"));
    }

    #[test]
    fn test_story_prompt_parallel_scene() {
        let mut params = params();
        params.language = Language::En;
        params.parallel_scene = Some("The general plots.".to_string());
        let prompt = story_prompt(&params);
        assert!(prompt.contains("Language: English."));
        assert!(prompt.contains("MEANWHILE / PARALLEL EVENTS:"));
        assert!(prompt.contains("\"The general plots.\""));
    }

    #[test]
    fn test_image_prompt_uses_primary_character() {
        let story = GeneratedStory {
            title: "Dawn".to_string(),
            content: String::new(),
            moral: String::new(),
        };
        let mut params = params();
        params.add_character();
        params.characters[1].setting_location = "Elsewhere".to_string();

        let prompt = image_prompt(&story, &params);
        assert!(prompt.contains("Scene: Dawn."));
        assert!(prompt.contains("Location: Puncak Batu Naga."));
        assert!(!prompt.contains("Elsewhere"));
        assert!(prompt.contains("Genre vibe: Fantasi, Aksi."));

        params.characters.clear();
        assert!(image_prompt(&story, &params).contains("Fantasy world"));
    }

    #[test]
    fn test_speech_prompt_wraps_text() {
        assert_eq!(
            speech_prompt("Once upon a time.", Language::Id),
            "Read this story with a warm, engaging, storytelling voice: \"Once upon a time.\""
        );
    }
}
