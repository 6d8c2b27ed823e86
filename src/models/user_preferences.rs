use serde::{Deserialize, Serialize};

/// Language shown in the prompt when the user has not picked one
pub const ANY_LANGUAGE: &str = "Any";

/// Genres offered as selectable tiles next to the free-text form
pub const GENRE_TILES: [&str; 11] = [
    "Action",
    "Comedy",
    "Documentary",
    "Family",
    "History",
    "Horror",
    "Mystery",
    "Romance",
    "Thriller",
    "Biography",
    "Sport",
];

/// Free-form taste profile a recommendation is seeded from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct UserPreferences {
    pub favorite_movie: Option<String>,
    /// Free text, or one of [`GENRE_TILES`]
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub favorite_actor: Option<String>,
    pub preferred_language: Option<String>,
}

impl UserPreferences {
    /// Creates empty user preferences
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_favorite_movie(mut self, movie: impl Into<String>) -> Self {
        self.favorite_movie = Some(movie.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_favorite_actor(mut self, actor: impl Into<String>) -> Self {
        self.favorite_actor = Some(actor.into());
        self
    }

    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = Some(language.into());
        self
    }

    /// Preferred language, falling back to [`ANY_LANGUAGE`] when unset or blank
    pub fn language(&self) -> &str {
        non_blank(&self.preferred_language).unwrap_or(ANY_LANGUAGE)
    }

    /// Whether the form carries enough to seed a recommendation
    ///
    /// At least a favorite movie or a genre is required. The pipeline does not check this;
    /// callers validate before submitting.
    pub fn is_submittable(&self) -> bool {
        non_blank(&self.favorite_movie).is_some() || non_blank(&self.genre).is_some()
    }

    /// Whether the chosen genre is one of the predefined tiles
    pub fn genre_is_tile(&self) -> bool {
        non_blank(&self.genre).is_some_and(|genre| GENRE_TILES.contains(&genre))
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}
