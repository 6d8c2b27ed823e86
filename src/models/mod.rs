use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

pub mod outcome;
pub mod user_preferences;

pub use outcome::{
    aggregate, FailureReason, InvocationToken, PipelineSnapshot, PipelineState,
    RecommendationOutcome,
};
pub use user_preferences::{UserPreferences, ANY_LANGUAGE, GENRE_TILES};

/// Base URL for catalog artwork; a size segment and the item's path are appended
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "w780";

/// Builds an artwork URL, or `None` when the item has no image at that path
pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", IMAGE_BASE_URL, size, p))
}

/// Treats an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn year_of(release_date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(release_date, "%Y-%m-%d")
        .ok()
        .map(|date| date.year())
}

// ============================================================================
// Completion Types
// ============================================================================

/// Raw text returned by the completion stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub raw_text: String,
}

impl CompletionResult {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    /// The recommended title with surrounding whitespace (newlines included) stripped
    pub fn recommended_title(&self) -> &str {
        self.raw_text.trim()
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// A movie as returned by the catalog's list endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre_ids: Vec<u64>,
}

impl CatalogItem {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: String::new(),
            vote_average: 0.0,
            genre_ids: Vec::new(),
        }
    }

    pub fn with_genres(mut self, genre_ids: Vec<u64>) -> Self {
        self.genre_ids = genre_ids;
        self
    }

    pub fn first_genre(&self) -> Option<u64> {
        self.genre_ids.first().copied()
    }

    pub fn release_year(&self) -> Option<i32> {
        year_of(&self.release_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full record behind the item-detail view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub release_date: String,
    pub release_year: Option<i32>,
    pub runtime: Option<u32>,
    pub status: Option<String>,
    pub vote_average: f64,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub genres: Vec<Genre>,
    pub primary_genre: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    /// Backdrop when available, poster otherwise
    pub banner_url: Option<String>,
    pub similar: Vec<CatalogItem>,
}

/// One page of catalog browse results
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogPage {
    pub page: u32,
    pub results: Vec<CatalogItem>,
    /// False once a page comes back empty
    pub has_more: bool,
}

/// Search/filter/pagination parameters for browsing the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowseQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub genre: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl BrowseQuery {
    /// Trimmed search text; `None` means browse by discovery instead
    pub fn search_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

// ============================================================================
// Catalog API Types
// ============================================================================

/// Envelope shared by the catalog's list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResultsPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<CatalogItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// API response from GET /movie/{id}?append_to_response=similar
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovieDetails {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vote_average: f64,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub similar: Option<ApiResultsPage>,
}

impl From<ApiMovieDetails> for MovieDetails {
    fn from(api: ApiMovieDetails) -> Self {
        let banner_url = image_url(
            api.backdrop_path
                .as_deref()
                .or(api.poster_path.as_deref()),
            BACKDROP_SIZE,
        );

        MovieDetails {
            id: api.id,
            release_year: year_of(&api.release_date),
            primary_genre: api.genres.first().map(|g| g.name.clone()),
            tagline: api.tagline.filter(|t| !t.is_empty()),
            title: api.title,
            overview: api.overview,
            release_date: api.release_date,
            runtime: api.runtime,
            status: api.status,
            vote_average: api.vote_average,
            budget: api.budget,
            revenue: api.revenue,
            genres: api.genres,
            poster_url: image_url(api.poster_path.as_deref(), POSTER_SIZE),
            poster_path: api.poster_path,
            backdrop_path: api.backdrop_path,
            banner_url,
            similar: api.similar.map(|page| page.results).unwrap_or_default(),
        }
    }
}
