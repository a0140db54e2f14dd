use super::{GenerationMode, IntensityLevel};

/// Trims free-text user context, treating blank input as absent.
pub fn normalize_context(context: Option<&str>) -> Option<&str> {
    context.map(str::trim).filter(|value| !value.is_empty())
}

/// Instruction sent alongside the photo to the vision model.
pub fn compose_image_prompt(
    mode: GenerationMode,
    level: IntensityLevel,
    context: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{}\n\nThe Twist: Take the subject and make it {}.",
        mode.profile().image_instruction,
        level.phrase()
    );

    if let Some(context) = normalize_context(context) {
        prompt.push_str(&format!(
            "\n\nAdditional context from the user about this photo: \"{context}\". Use this to inform your transformation."
        ));
    }

    prompt
}

/// Instruction for the caption model. `source` is either the vision model's
/// description or, when regenerating, the previously stored caption.
pub fn compose_caption_prompt(mode: GenerationMode, source: &str) -> String {
    format!(
        "{}\n\nThe image shows: \"{}\"",
        mode.profile().caption_instruction,
        source
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_prompt_covers_every_pair() {
        for mode in GenerationMode::ALL {
            for level in IntensityLevel::ALL {
                let prompt = compose_image_prompt(mode, level, None);
                assert!(prompt.starts_with(mode.profile().image_instruction));
                assert!(prompt.contains(&format!("make it {}.", level.phrase())));
                assert_eq!(prompt, compose_image_prompt(mode, level, None));
            }
        }
    }

    #[test]
    fn caption_prompt_covers_every_mode() {
        for mode in GenerationMode::ALL {
            let prompt = compose_caption_prompt(mode, "a cat on a couch");
            assert!(prompt.starts_with(mode.profile().caption_instruction));
            assert!(prompt.ends_with("The image shows: \"a cat on a couch\""));
            assert_eq!(prompt, compose_caption_prompt(mode, "a cat on a couch"));
        }
    }

    #[test]
    fn context_is_trimmed_and_appended() {
        let prompt = compose_image_prompt(
            GenerationMode::Linkedin,
            IntensityLevel::Mild,
            Some("  my cat, Waffles  "),
        );
        assert!(prompt.ends_with(
            "Additional context from the user about this photo: \"my cat, Waffles\". Use this to inform your transformation."
        ));
    }

    #[test]
    fn blank_context_adds_no_clause() {
        let bare = compose_image_prompt(GenerationMode::Etsy, IntensityLevel::Extreme, None);
        for blank in ["", "   ", "\n\t"] {
            let prompt =
                compose_image_prompt(GenerationMode::Etsy, IntensityLevel::Extreme, Some(blank));
            assert_eq!(prompt, bare);
            assert!(!prompt.contains("Additional context"));
        }
    }
}
