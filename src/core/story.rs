use crate::core::error::ValidationError;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Genre tags offered by the story form.
pub const GENRES: &[&str] = &[
    "Aksi",
    "Martial Art",
    "Xianxia",
    "Xianhuan",
    "Romansa",
    "Fantasi",
    "Komedi",
    "Horor",
    "Misteri",
    "Supernatural",
    "Sci-Fi",
    "Thriller",
    "Sejarah",
    "Drama",
    "Petualangan",
    "Isekai",
    "Slice of Life",
    "Cyberpunk",
    "Steampunk",
    "Dystopian",
];

const DEFAULT_GENRE: &str = "Fantasi";
const MAIN_ROLE: &str = "Utama";
const SUPPORTING_ROLE: &str = "Pendukung";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Id,
    En,
}

impl Language {
    /// Language name as written into generation prompts.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::Id => "Bahasa Indonesia",
            Language::En => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt_name())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    #[default]
    #[serde(rename = "Laki-laki")]
    Male,
    #[serde(rename = "Perempuan")]
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Laki-laki"),
            Gender::Female => f.write_str("Perempuan"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub age: String,
    pub role: String,
    pub description: String,
    pub setting_environment: String,
    pub setting_location: String,
    pub setting_atmosphere: String,
    pub setting_visuals: String,
}

impl Character {
    pub fn new(role: &str) -> Self {
        Self {
            id: new_character_id(),
            role: role.to_string(),
            ..Default::default()
        }
    }

    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Editable character fields, addressed by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterField {
    Name,
    Age,
    Role,
    Description,
    SettingEnvironment,
    SettingLocation,
    SettingAtmosphere,
    SettingVisuals,
}

impl CharacterField {
    pub const ALL: [CharacterField; 8] = [
        CharacterField::Name,
        CharacterField::Age,
        CharacterField::Role,
        CharacterField::Description,
        CharacterField::SettingEnvironment,
        CharacterField::SettingLocation,
        CharacterField::SettingAtmosphere,
        CharacterField::SettingVisuals,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CharacterField::Name => "Name",
            CharacterField::Age => "Age",
            CharacterField::Role => "Role",
            CharacterField::Description => "Traits / description",
            CharacterField::SettingEnvironment => "Environment",
            CharacterField::SettingLocation => "Specific location",
            CharacterField::SettingAtmosphere => "Environment description",
            CharacterField::SettingVisuals => "Location description",
        }
    }

    pub fn get<'a>(&self, character: &'a Character) -> &'a str {
        match self {
            CharacterField::Name => &character.name,
            CharacterField::Age => &character.age,
            CharacterField::Role => &character.role,
            CharacterField::Description => &character.description,
            CharacterField::SettingEnvironment => &character.setting_environment,
            CharacterField::SettingLocation => &character.setting_location,
            CharacterField::SettingAtmosphere => &character.setting_atmosphere,
            CharacterField::SettingVisuals => &character.setting_visuals,
        }
    }

    fn slot<'a>(&self, character: &'a mut Character) -> &'a mut String {
        match self {
            CharacterField::Name => &mut character.name,
            CharacterField::Age => &mut character.age,
            CharacterField::Role => &mut character.role,
            CharacterField::Description => &mut character.description,
            CharacterField::SettingEnvironment => &mut character.setting_environment,
            CharacterField::SettingLocation => &mut character.setting_location,
            CharacterField::SettingAtmosphere => &mut character.setting_atmosphere,
            CharacterField::SettingVisuals => &mut character.setting_visuals,
        }
    }
}

fn new_character_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoryParams {
    pub main_title: String,
    pub chapter_number: String,
    pub chapter_title: String,
    pub characters: Vec<Character>,
    pub genres: Vec<String>,
    pub theme: String,
    pub language: Language,
    #[serde(default)]
    pub parallel_scene: Option<String>,
}

impl Default for StoryParams {
    fn default() -> Self {
        Self {
            main_title: String::new(),
            chapter_number: "1".to_string(),
            chapter_title: String::new(),
            characters: vec![Character {
                id: "1".to_string(),
                ..Character::new(MAIN_ROLE)
            }],
            genres: vec![DEFAULT_GENRE.to_string()],
            theme: String::new(),
            language: Language::default(),
            parallel_scene: None,
        }
    }
}

impl StoryParams {
    /// Checks the minimum the generator needs: one named character, a theme
    /// and at least one genre.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.characters.iter().any(Character::is_named) {
            return Err(ValidationError::NoNamedCharacter);
        }
        if self.theme.trim().is_empty() {
            return Err(ValidationError::MissingTheme);
        }
        if self.genres.is_empty() {
            return Err(ValidationError::NoGenre);
        }
        Ok(())
    }

    /// Parallel scene text, if any non-blank text was entered.
    pub fn parallel_scene(&self) -> Option<&str> {
        self.parallel_scene
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn primary_character(&self) -> Option<&Character> {
        self.characters.first()
    }

    pub fn add_character(&mut self) -> &Character {
        self.characters.push(Character::new(SUPPORTING_ROLE));
        &self.characters[self.characters.len() - 1]
    }

    /// Removes a character unless it is the last one left.
    pub fn remove_character(&mut self, id: &str) -> bool {
        if self.characters.len() <= 1 {
            return false;
        }
        let before = self.characters.len();
        self.characters.retain(|c| c.id != id);
        self.characters.len() != before
    }

    pub fn update_character(&mut self, id: &str, field: CharacterField, value: &str) -> bool {
        match self.characters.iter_mut().find(|c| c.id == id) {
            Some(character) => {
                *field.slot(character) = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_gender(&mut self, id: &str, gender: Gender) -> bool {
        match self.characters.iter_mut().find(|c| c.id == id) {
            Some(character) => {
                character.gender = gender;
                true
            }
            None => false,
        }
    }

    pub fn toggle_genre(&mut self, genre: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        } else {
            self.genres.push(genre.to_string());
        }
    }

    /// Picks one of the built-in example stories. Language is left as the
    /// caller had it.
    pub fn example<R: Rng + ?Sized>(rng: &mut R, language: Language) -> Self {
        let examples = [dragon_swordsman(), magic_academy()];
        let mut params = examples
            .choose(rng)
            .cloned()
            .unwrap_or_else(dragon_swordsman);
        params.language = language;
        params
    }
}

fn example_character(
    id: &str,
    name: &str,
    gender: Gender,
    age: &str,
    role: &str,
    description: &str,
    setting: [&str; 4],
) -> Character {
    let [environment, location, atmosphere, visuals] = setting;
    Character {
        id: id.to_string(),
        name: name.to_string(),
        gender,
        age: age.to_string(),
        role: role.to_string(),
        description: description.to_string(),
        setting_environment: environment.to_string(),
        setting_location: location.to_string(),
        setting_atmosphere: atmosphere.to_string(),
        setting_visuals: visuals.to_string(),
    }
}

fn dragon_swordsman() -> StoryParams {
    StoryParams {
        main_title: "Legenda Pendekar Naga".to_string(),
        chapter_number: "1".to_string(),
        chapter_title: "Pertemuan di Gunung Kabut".to_string(),
        characters: vec![
            example_character(
                "ex1",
                "Wei",
                Gender::Male,
                "18",
                MAIN_ROLE,
                "Pendekar pedang muda yang mencari jati diri, memakai jubah biru usang.",
                [
                    "Pegunungan Tinggi",
                    "Puncak Batu Naga",
                    "Sunyi, dingin, berkabut tebal, suara elang dari kejauhan.",
                    "Jurang terjal dengan pohon pinus tua yang tumbuh miring, kuil runtuh di latar belakang.",
                ],
            ),
            example_character(
                "ex2",
                "Mei Lin",
                Gender::Female,
                "17",
                SUPPORTING_ROLE,
                "Ahli obat-obatan dari lembah tersembunyi.",
                [
                    "Hutan Bambu",
                    "Gubuk Herbal",
                    "Tenang, aroma obat herbal yang kuat, suara gemericik air.",
                    "Sinar matahari menembus daun bambu, sungai kecil mengalir jernih, rak-rak penuh botol obat.",
                ],
            ),
        ],
        genres: vec!["Aksi".to_string(), "Martial Art".to_string(), "Xianxia".to_string()],
        theme: "Kehormatan dan takdir".to_string(),
        language: Language::Id,
        parallel_scene: Some(
            "Di istana kekaisaran yang jauh, Jenderal Hitam sedang menerima laporan mata-mata tentang keberadaan pedang pusaka yang dibawa Wei."
                .to_string(),
        ),
    }
}

fn magic_academy() -> StoryParams {
    StoryParams {
        main_title: "Akademi Sihir Modern".to_string(),
        chapter_number: "1".to_string(),
        chapter_title: "Surat Penerimaan".to_string(),
        characters: vec![example_character(
            "ex3",
            "Aruna",
            Gender::Female,
            "16",
            "Murid Baru",
            "Gadis biasa yang tiba-tiba membangkitkan kekuatan es.",
            [
                "Kota Neo-Jakarta",
                "Kamar Tidur Apartemen",
                "Futuristik tapi berantakan, suara sirine mobil terbang samar-samar.",
                "Lampu neon dari jendela, hologram melayang, buku-buku berserakan di lantai.",
            ],
        )],
        genres: vec![
            "Fantasi".to_string(),
            "Slice of Life".to_string(),
            "Komedi".to_string(),
        ],
        theme: "Persahabatan masa sekolah".to_string(),
        language: Language::Id,
        parallel_scene: Some(
            "Di ruang kepala sekolah, para dewan penyihir sedang berdebat tentang ramalan kuno yang mulai menjadi kenyataan."
                .to_string(),
        ),
    }
}

/// Story text returned by the text stage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GeneratedStory {
    pub title: String,
    pub content: String,
    pub moral: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn named(name: &str) -> StoryParams {
        let mut params = StoryParams::default();
        params.characters[0].name = name.to_string();
        params.theme = "honor".to_string();
        params
    }

    #[test]
    fn test_validate_accepts_minimal_params() {
        assert!(named("Wei").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        let params = named("   ");
        assert_eq!(params.validate(), Err(ValidationError::NoNamedCharacter));
    }

    #[test]
    fn test_validate_rejects_missing_theme_and_genre() {
        let mut params = named("Wei");
        params.theme = " ".to_string();
        assert_eq!(params.validate(), Err(ValidationError::MissingTheme));

        let mut params = named("Wei");
        params.genres.clear();
        assert_eq!(params.validate(), Err(ValidationError::NoGenre));
    }

    #[test]
    fn test_last_character_cannot_be_removed() {
        let mut params = StoryParams::default();
        let id = params.characters[0].id.clone();
        assert!(!params.remove_character(&id));
        assert_eq!(params.characters.len(), 1);

        let added = params.add_character().id.clone();
        assert_eq!(params.characters[1].role, SUPPORTING_ROLE);
        assert!(params.remove_character(&id));
        assert_eq!(params.characters.len(), 1);
        assert_eq!(params.characters[0].id, added);
    }

    #[test]
    fn test_update_character_field() {
        let mut params = StoryParams::default();
        let id = params.characters[0].id.clone();
        assert!(params.update_character(&id, CharacterField::SettingLocation, "Puncak"));
        assert!(params.set_gender(&id, Gender::Female));
        assert_eq!(params.characters[0].setting_location, "Puncak");
        assert_eq!(params.characters[0].gender, Gender::Female);
        assert!(!params.update_character("missing", CharacterField::Name, "x"));
    }

    #[test]
    fn test_toggle_genre() {
        let mut params = StoryParams::default();
        params.toggle_genre("Horor");
        assert_eq!(params.genres, vec!["Fantasi", "Horor"]);
        params.toggle_genre("Fantasi");
        assert_eq!(params.genres, vec!["Horor"]);
    }

    #[test]
    fn test_parallel_scene_blank_is_absent() {
        let mut params = StoryParams::default();
        params.parallel_scene = Some("  ".to_string());
        assert_eq!(params.parallel_scene(), None);
        params.parallel_scene = Some(" Meanwhile ".to_string());
        assert_eq!(params.parallel_scene(), Some("Meanwhile"));
    }

    #[test]
    fn test_example_is_valid_and_keeps_language() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let params = StoryParams::example(&mut rng, Language::En);
            assert!(params.validate().is_ok());
            assert_eq!(params.language, Language::En);
        }
    }

    #[test]
    fn test_gender_serializes_with_form_labels() {
        let json = serde_json::to_string(&Gender::Female).unwrap();
        assert_eq!(json, "\"Perempuan\"");
    }
}
