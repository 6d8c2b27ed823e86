/// External data provider abstraction
///
/// The recommendation pipeline talks to two third-party services: a chat-completion
/// endpoint that turns a prompt into a movie title, and a movie catalog that resolves
/// titles into records and supplies related items. Each sits behind a trait so the
/// pipeline and the HTTP layer never depend on a concrete vendor.
use crate::{
    error::{AppError, AppResult},
    models::{BrowseQuery, CatalogItem, CatalogPage, CompletionResult, Genre, MovieDetails},
};

pub mod openai;
pub mod tmdb;

/// Trait for chat-completion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends `prompt` as a single user message and returns the first choice's content
    ///
    /// Does not retry. Transport failures, non-2xx statuses and bodies without a first
    /// choice are all errors.
    async fn complete(&self, prompt: &str) -> AppResult<CompletionResult>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search for movies by title
    ///
    /// Results are ranked by relevance by the provider.
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<CatalogItem>>;

    /// Items the provider recommends for the movie with `id`
    async fn recommendations(&self, id: u64) -> AppResult<Vec<CatalogItem>>;

    /// Items in `genre_id`, most popular first
    async fn discover_by_genre(&self, genre_id: u64) -> AppResult<Vec<CatalogItem>>;

    /// Full record for one movie, including similar titles
    async fn movie_details(&self, id: u64) -> AppResult<MovieDetails>;

    /// One page of the catalog's popular list, used when browsing without filters
    async fn popular(&self, page: u32) -> AppResult<CatalogPage>;

    /// One page of search, discovery or popular results
    async fn browse(&self, query: &BrowseQuery) -> AppResult<CatalogPage>;

    /// Genres the catalog knows about
    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Turns a non-2xx response into an `ExternalApi` error, keeping the body for diagnostics
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(
        provider = provider,
        status = %status,
        body = %body,
        "External API request failed"
    );

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(format!(
            "{} API returned status {}",
            provider, status
        )));
    }

    Err(AppError::ExternalApi(format!(
        "{} API returned status {}: {}",
        provider, status, body
    )))
}
