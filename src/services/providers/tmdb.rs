/// Movie catalog provider (TMDB v3)
///
/// Every request authenticates with the `api_key` query parameter. List endpoints share
/// the `{page, results: [...]}` envelope.
///
/// API Flow:
/// 1. Title search: /search/movie → `results[0]` is the best match
/// 2. Related items: /movie/{id}/recommendations, or /discover/movie by genre
/// 3. Detail view: /movie/{id}?append_to_response=similar
/// 4. Landing list: /movie/popular, paged
use crate::{
    config::ApiKey,
    error::{AppError, AppResult},
    models::{
        ApiGenreList, ApiMovieDetails, ApiResultsPage, BrowseQuery, CatalogItem, CatalogPage,
        Genre, MovieDetails,
    },
    services::providers::{ensure_success, CatalogProvider},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const PROVIDER: &str = "tmdb";
const POPULARITY_DESC: &str = "popularity.desc";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: ApiKey,
    api_url: String,
    /// Language tag sent with recommendation lookups
    language: String,
}

impl TmdbClient {
    pub fn new(http_client: HttpClient, api_key: ApiKey, api_url: String, language: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
        }
    }

    /// GETs `path` with the api key plus `params` and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.expose())])
            .query(params)
            .send()
            .await?;

        let response = ensure_success(PROVIDER, response).await?;

        let response_text = response.text().await?;
        tracing::debug!(path = %path, bytes = response_text.len(), "Raw TMDB API response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn get_results(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<ApiResultsPage> {
        self.get_json::<ApiResultsPage>(path, params).await
    }
}

fn into_catalog_page(page_number: u32, page: ApiResultsPage) -> CatalogPage {
    CatalogPage {
        page: page_number,
        has_more: !page.results.is_empty(),
        results: page.results,
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<CatalogItem>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search title cannot be empty".to_string(),
            ));
        }

        let page = self
            .get_results("/search/movie", &[("query", title.to_string())])
            .await?;

        tracing::info!(
            query = %title,
            results = page.results.len(),
            provider = PROVIDER,
            "Title search completed"
        );

        Ok(page.results)
    }

    async fn recommendations(&self, id: u64) -> AppResult<Vec<CatalogItem>> {
        let page = self
            .get_results(
                &format!("/movie/{}/recommendations", id),
                &[("language", self.language.clone()), ("page", "1".to_string())],
            )
            .await?;

        tracing::info!(
            movie_id = id,
            results = page.results.len(),
            provider = PROVIDER,
            "Recommendations fetched"
        );

        Ok(page.results)
    }

    async fn discover_by_genre(&self, genre_id: u64) -> AppResult<Vec<CatalogItem>> {
        let page = self
            .get_results(
                "/discover/movie",
                &[
                    ("with_genres", genre_id.to_string()),
                    ("sort_by", POPULARITY_DESC.to_string()),
                ],
            )
            .await?;

        tracing::info!(
            genre_id = genre_id,
            results = page.results.len(),
            provider = PROVIDER,
            "Genre discovery completed"
        );

        Ok(page.results)
    }

    async fn movie_details(&self, id: u64) -> AppResult<MovieDetails> {
        let details: ApiMovieDetails = self
            .get_json(
                &format!("/movie/{}", id),
                &[("append_to_response", "similar".to_string())],
            )
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(format!("Movie {} not found", id)),
                other => other,
            })?;

        Ok(MovieDetails::from(details))
    }

    async fn popular(&self, page_number: u32) -> AppResult<CatalogPage> {
        let page = self
            .get_results("/movie/popular", &[("page", page_number.to_string())])
            .await?;

        tracing::info!(
            page = page_number,
            results = page.results.len(),
            provider = PROVIDER,
            "Popular movies fetched"
        );

        Ok(into_catalog_page(page_number, page))
    }

    async fn browse(&self, query: &BrowseQuery) -> AppResult<CatalogPage> {
        let page_number = query.page();

        let page = match (query.search_text(), query.genre) {
            (Some(text), _) => {
                self.get_results(
                    "/search/movie",
                    &[("query", text.to_string()), ("page", page_number.to_string())],
                )
                .await?
            }
            (None, Some(genre)) => {
                self.get_results(
                    "/discover/movie",
                    &[
                        ("page", page_number.to_string()),
                        ("with_genres", genre.to_string()),
                    ],
                )
                .await?
            }
            // Landing list
            (None, None) => return self.popular(page_number).await,
        };

        tracing::info!(
            page = page_number,
            results = page.results.len(),
            provider = PROVIDER,
            "Catalog page fetched"
        );

        Ok(into_catalog_page(page_number, page))
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        let list: ApiGenreList = self.get_json("/genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
