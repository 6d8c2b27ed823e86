use crate::models::UserPreferences;

/// Builds the completion prompt for a set of preferences
///
/// Every field is rendered on its own labelled line, empty when missing, so identical
/// preferences always produce byte-identical prompts.
pub fn build_prompt(prefs: &UserPreferences) -> String {
    format!(
        "Recommend a movie based on:\n\
         - Favorite Movie: {}\n\
         - Favorite Genre: {}\n\
         - Mood: {}\n\
         - Favorite Actor: {}\n\
         - Preferred Language: {}\n\
         Give only the movie title.",
        field(&prefs.favorite_movie),
        field(&prefs.genre),
        field(&prefs.mood),
        field(&prefs.favorite_actor),
        prefs.language(),
    )
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let prefs = UserPreferences::new()
            .with_favorite_movie("Inception")
            .with_mood("tense");
        assert_eq!(build_prompt(&prefs), build_prompt(&prefs.clone()));
    }

    #[test]
    fn test_prompt_contains_all_labelled_fields() {
        let prefs = UserPreferences::new()
            .with_favorite_movie("Inception")
            .with_genre("")
            .with_mood("tense")
            .with_favorite_actor("")
            .with_preferred_language("English");

        let prompt = build_prompt(&prefs);
        assert!(prompt.contains("- Favorite Movie: Inception\n"));
        assert!(prompt.contains("- Favorite Genre: \n"));
        assert!(prompt.contains("- Mood: tense\n"));
        assert!(prompt.contains("- Favorite Actor: \n"));
        assert!(prompt.contains("- Preferred Language: English\n"));
        assert!(prompt.ends_with("Give only the movie title."));
    }

    #[test]
    fn test_missing_fields_render_as_empty_lines() {
        let prompt = build_prompt(&UserPreferences::new());
        assert_eq!(
            prompt,
            "Recommend a movie based on:\n\
             - Favorite Movie: \n\
             - Favorite Genre: \n\
             - Mood: \n\
             - Favorite Actor: \n\
             - Preferred Language: Any\n\
             Give only the movie title."
        );
    }
}
