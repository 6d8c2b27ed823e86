use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Recommendation pipeline
        .route("/recommendations", post(handlers::recommend))
        .route("/recommendations/state", get(handlers::recommendation_state))
        // Genres
        .route("/genres", get(handlers::genres))
        .route("/genres/tiles", get(handlers::genre_tiles))
        // Catalog
        .route("/movies", get(handlers::browse))
        .route("/movies/:id", get(handlers::movie_details))
}
