use crate::core::state::{Artifact, PipelineResult, Stage};
use crate::core::story::Language;
use crate::services::playback::PlaybackState;

/// Spinner text for a stage.
pub fn stage_label(stage: Stage, language: Language) -> &'static str {
    match (stage, language) {
        (Stage::Writing, Language::Id) => "Merangkai Kata...",
        (Stage::Drawing, Language::Id) => "Melukis Imajinasi...",
        (Stage::Narrating, Language::Id) => "Merekam Suara...",
        (Stage::Writing, Language::En) => "Weaving words...",
        (Stage::Drawing, Language::En) => "Painting the scene...",
        (Stage::Narrating, Language::En) => "Recording the narration...",
        (Stage::Idle, _) => "",
    }
}

/// Rough completion shown next to the spinner.
pub fn stage_percent(stage: Stage) -> u8 {
    match stage {
        Stage::Idle => 100,
        Stage::Writing => 30,
        Stage::Drawing => 66,
        Stage::Narrating => 90,
    }
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

pub fn render_result(result: &PipelineResult, language: Language) -> String {
    let (no_image, no_audio, moral) = match language {
        Language::Id => (
            "Ilustrasi Tidak Tersedia",
            "Audio sedang diproses atau tidak tersedia",
            "Pesan Moral",
        ),
        Language::En => ("Illustration unavailable", "Narration unavailable", "Moral"),
    };

    let rule = "=".repeat(result.story.title.chars().count().clamp(8, 72));

    let image = match &result.image {
        Artifact::Ready(image) => {
            let size = image.bytes().map(|b| b.len()).unwrap_or(0);
            format!("[{} · {}]", image.mime_type, format_size(size))
        }
        Artifact::Missing(_) => format!("[{}]", no_image),
    };

    let audio = match &result.audio {
        Artifact::Ready(audio) => {
            let secs = audio.duration().as_secs();
            format!("♪ {}:{:02}", secs / 60, secs % 60)
        }
        Artifact::Missing(_) => format!("♪ {}", no_audio),
    };

    format!(
        "{rule}\n{title}\n{rule}\n{image}\n{audio}\n\n{content}\n\n★ {moral}: {lesson}",
        title = result.story.title,
        content = result.story.content.trim(),
        lesson = result.story.moral.trim(),
    )
}

/// Label of the narration toggle.
pub fn playback_label(state: PlaybackState, language: Language) -> &'static str {
    match (state, language) {
        (PlaybackState::Playing, Language::Id) => "Jeda Narasi",
        (PlaybackState::Stopped, Language::Id) => "Dengarkan Cerita",
        (PlaybackState::Playing, Language::En) => "Stop narration",
        (PlaybackState::Stopped, Language::En) => "Listen to the story",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{SkipReason, StoryImage};
    use crate::core::story::GeneratedStory;
    use crate::utils::audio::AudioBuffer;

    fn result(image: bool, audio: bool) -> PipelineResult {
        PipelineResult {
            story: GeneratedStory {
                title: "Pertemuan di Gunung Kabut".to_string(),
                content: "Wei berdiri di puncak.".to_string(),
                moral: "Kehormatan menuntun jalan.".to_string(),
            },
            image: if image {
                Artifact::Ready(StoryImage {
                    mime_type: "image/png".to_string(),
                    data: "aGk=".to_string(),
                })
            } else {
                Artifact::Missing(SkipReason::Failed("quota".to_string()))
            },
            audio: if audio {
                Artifact::Ready(AudioBuffer::new(vec![0.0; 24_000 * 75], 24_000))
            } else {
                Artifact::Missing(SkipReason::NotReturned)
            },
        }
    }

    #[test]
    fn test_render_complete_result() {
        let text = render_result(&result(true, true), Language::Id);
        assert!(text.contains("Pertemuan di Gunung Kabut"));
        assert!(text.contains("[image/png · 1 KB]"));
        assert!(text.contains("♪ 1:15"));
        assert!(text.contains("Wei berdiri di puncak."));
        assert!(text.ends_with("★ Pesan Moral: Kehormatan menuntun jalan."));
    }

    #[test]
    fn test_render_line_layout() {
        let text = render_result(&result(true, false), Language::En);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], lines[2]);
        assert!(lines[0].chars().all(|c| c == '='));
        assert_eq!(lines[1], "Pertemuan di Gunung Kabut");
        assert_eq!(lines[3], "[image/png · 1 KB]");
        assert_eq!(lines[4], "♪ Narration unavailable");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Wei berdiri di puncak.");
    }

    #[test]
    fn test_render_missing_artifacts() {
        let text = render_result(&result(false, false), Language::En);
        assert!(text.contains("[Illustration unavailable]"));
        assert!(text.contains("♪ Narration unavailable"));
        assert!(text.contains("★ Moral:"));
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(stage_label(Stage::Drawing, Language::Id), "Melukis Imajinasi...");
        assert_eq!(stage_label(Stage::Idle, Language::En), "");
        assert!(stage_percent(Stage::Writing) < stage_percent(Stage::Narrating));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 KB");
        assert_eq!(format_size(1500), "2 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
