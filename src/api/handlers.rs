use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        BrowseQuery, CatalogPage, Genre, MovieDetails, PipelineSnapshot, RecommendationOutcome,
        UserPreferences, GENRE_TILES,
    },
    services::catalog,
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Runs the recommendation pipeline for the submitted preferences
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(prefs): Json<UserPreferences>,
) -> AppResult<Json<RecommendationOutcome>> {
    if !prefs.is_submittable() {
        return Err(AppError::InvalidInput(
            "Please enter a movie or pick a genre".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request_id,
        genre_tile = prefs.genre_is_tile(),
        "Processing recommendation request"
    );

    let outcome = state.pipeline.submit_detached(prefs).await?;

    tracing::info!(
        request_id = %request_id,
        failure = ?outcome.failure_reason,
        matched = outcome.primary.is_some(),
        "Recommendation request finished"
    );

    Ok(Json(outcome))
}

/// Latest pipeline state
pub async fn recommendation_state(State(state): State<AppState>) -> Json<PipelineSnapshot> {
    Json(state.pipeline.snapshot())
}

pub async fn genre_tiles() -> Json<Vec<&'static str>> {
    Json(GENRE_TILES.to_vec())
}

pub async fn genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = catalog::genres(state.catalog.as_ref()).await?;
    Ok(Json(genres))
}

/// Item-detail view, including similar titles
pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<MovieDetails>> {
    let details = catalog::movie_details(state.catalog.as_ref(), id).await?;
    Ok(Json(details))
}

/// Search or discovery listing with optional genre filter and pagination
pub async fn browse(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> AppResult<Json<CatalogPage>> {
    let page = catalog::browse(state.catalog.as_ref(), &query).await?;
    Ok(Json(page))
}
