use std::sync::Arc;

use crate::services::{CatalogProvider, RecommendationPipeline};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecommendationPipeline>,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(pipeline: Arc<RecommendationPipeline>, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { pipeline, catalog }
    }
}
