use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::CatalogItem,
    services::providers::CatalogProvider,
};

/// How related items are looked up for a primary match
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelatedStrategy {
    /// Ask the catalog what it recommends for the item's id
    #[default]
    Recommendations,
    /// Discover the most popular items in the item's first genre
    Genre,
}

/// Fetches the "more like this" list for a primary match
///
/// Enrichment only: failures are logged and yield an empty list so the primary match can
/// still be delivered.
#[derive(Clone)]
pub struct RelatedItems {
    catalog: Arc<dyn CatalogProvider>,
    strategy: RelatedStrategy,
    limit: usize,
}

impl RelatedItems {
    pub fn new(catalog: Arc<dyn CatalogProvider>, strategy: RelatedStrategy, limit: usize) -> Self {
        Self {
            catalog,
            strategy,
            limit,
        }
    }

    /// Related items in provider order, at most `limit` of them
    pub async fn fetch(&self, item: &CatalogItem) -> Vec<CatalogItem> {
        match self.lookup(item).await {
            Ok(mut items) => {
                items.truncate(self.limit);
                items
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    movie_id = item.id,
                    provider = self.catalog.name(),
                    "Related items fetch failed, continuing without them"
                );
                Vec::new()
            }
        }
    }

    async fn lookup(&self, item: &CatalogItem) -> AppResult<Vec<CatalogItem>> {
        match self.strategy {
            RelatedStrategy::Recommendations => match self.catalog.recommendations(item.id).await {
                // No id-based list for this item; fall back to its genre
                Err(AppError::NotFound(_)) => self.by_genre(item).await,
                other => other,
            },
            RelatedStrategy::Genre => self.by_genre(item).await,
        }
    }

    async fn by_genre(&self, item: &CatalogItem) -> AppResult<Vec<CatalogItem>> {
        match item.first_genre() {
            Some(genre_id) => self.catalog.discover_by_genre(genre_id).await,
            None => {
                tracing::debug!(movie_id = item.id, "No genre to discover related items by");
                Ok(Vec::new())
            }
        }
    }
}
