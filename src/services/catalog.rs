use crate::{
    error::{AppError, AppResult},
    models::{BrowseQuery, CatalogPage, Genre, MovieDetails},
    services::providers::CatalogProvider,
};

/// Service functions for the catalog views
///
/// Delegate to the configured CatalogProvider, maintaining a clean separation between
/// HTTP routing and business logic.
pub async fn browse(provider: &dyn CatalogProvider, query: &BrowseQuery) -> AppResult<CatalogPage> {
    if query.page() == 0 {
        return Err(AppError::InvalidInput("Pages start at 1".to_string()));
    }
    provider.browse(query).await
}

pub async fn movie_details(provider: &dyn CatalogProvider, id: u64) -> AppResult<MovieDetails> {
    provider.movie_details(id).await
}

pub async fn genres(provider: &dyn CatalogProvider) -> AppResult<Vec<Genre>> {
    provider.genres().await
}
