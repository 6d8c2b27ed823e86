use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use cinematch_api::{
    api::{create_router, AppState},
    config::ApiKey,
    error::{AppError, AppResult},
    models::{
        BrowseQuery, CatalogItem, CatalogPage, CompletionResult, Genre, MovieDetails,
    },
    services::{
        providers::tmdb::TmdbClient, CatalogProvider, CompletionProvider, PipelineSettings,
        RecommendationPipeline,
    },
};

/// Completion stub answering every prompt with the same text, or failing
struct StubCompletion {
    answer: Option<&'static str>,
}

#[async_trait::async_trait]
impl CompletionProvider for StubCompletion {
    async fn complete(&self, _prompt: &str) -> AppResult<CompletionResult> {
        match self.answer {
            Some(text) => Ok(CompletionResult::new(text)),
            None => Err(AppError::ExternalApi("completion unavailable".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub-completion"
    }
}

/// Catalog stub that knows a single movie
struct StubCatalog {
    movie: CatalogItem,
    related_count: u64,
}

impl StubCatalog {
    fn related(&self) -> Vec<CatalogItem> {
        (1..=self.related_count)
            .map(|id| CatalogItem::new(id, format!("Related {}", id)))
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn search_by_title(&self, title: &str) -> AppResult<Vec<CatalogItem>> {
        if title == self.movie.title {
            Ok(vec![self.movie.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn recommendations(&self, _id: u64) -> AppResult<Vec<CatalogItem>> {
        Ok(self.related())
    }

    async fn discover_by_genre(&self, _genre_id: u64) -> AppResult<Vec<CatalogItem>> {
        Ok(self.related())
    }

    async fn movie_details(&self, id: u64) -> AppResult<MovieDetails> {
        if id != self.movie.id {
            return Err(AppError::NotFound(format!("Movie {} not found", id)));
        }
        Ok(MovieDetails {
            id,
            title: self.movie.title.clone(),
            tagline: None,
            overview: String::new(),
            release_date: "2014-11-05".to_string(),
            release_year: Some(2014),
            runtime: Some(169),
            status: Some("Released".to_string()),
            vote_average: 8.4,
            budget: None,
            revenue: None,
            genres: vec![Genre {
                id: 12,
                name: "Adventure".to_string(),
            }],
            primary_genre: Some("Adventure".to_string()),
            poster_path: None,
            backdrop_path: None,
            poster_url: None,
            banner_url: None,
            similar: self.related(),
        })
    }

    async fn popular(&self, page: u32) -> AppResult<CatalogPage> {
        Ok(CatalogPage {
            page,
            has_more: true,
            results: self.related(),
        })
    }

    async fn browse(&self, query: &BrowseQuery) -> AppResult<CatalogPage> {
        let results = if query.page() > 1 {
            Vec::new()
        } else {
            vec![self.movie.clone()]
        };
        Ok(CatalogPage {
            page: query.page(),
            has_more: !results.is_empty(),
            results,
        })
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        Ok(vec![Genre {
            id: 12,
            name: "Adventure".to_string(),
        }])
    }

    fn name(&self) -> &'static str {
        "stub-catalog"
    }
}

fn create_test_server(answer: Option<&'static str>) -> TestServer {
    let catalog: Arc<dyn CatalogProvider> = Arc::new(StubCatalog {
        movie: CatalogItem::new(157336, "Interstellar").with_genres(vec![12, 18, 878]),
        related_count: 25,
    });
    create_server_with_catalog(answer, catalog)
}

fn create_server_with_catalog(
    answer: Option<&'static str>,
    catalog: Arc<dyn CatalogProvider>,
) -> TestServer {
    let pipeline = Arc::new(RecommendationPipeline::new(
        Arc::new(StubCompletion { answer }),
        catalog.clone(),
        PipelineSettings {
            related_limit: 20,
            ..Default::default()
        },
    ));

    let app = create_router(AppState::new(pipeline, catalog));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Some("Interstellar"));
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendation_flow() {
    let server = create_test_server(Some("Interstellar\n"));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "favorite_movie": "Inception",
            "genre": "",
            "mood": "tense",
            "favorite_actor": "",
            "preferred_language": "English"
        }))
        .await;

    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["primary"]["title"], "Interstellar");
    assert_eq!(outcome["related"].as_array().unwrap().len(), 20);
    assert_eq!(outcome["failure_reason"], Value::Null);

    let response = server.get("/api/v1/recommendations/state").await;
    response.assert_status_ok();
    let snapshot: Value = response.json();
    assert_eq!(snapshot["token"], 1);
    assert_eq!(snapshot["state"], "done");
}

#[tokio::test]
async fn test_recommendation_requires_movie_or_genre() {
    let server = create_test_server(Some("Interstellar"));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "mood": "happy" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Please enter a movie or pick a genre");
}

#[tokio::test]
async fn test_recommendation_no_match() {
    let server = create_test_server(Some("A Film Nobody Made"));

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "genre": "Horror" }))
        .await;

    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["primary"], Value::Null);
    assert_eq!(outcome["failure_reason"], Value::Null);
    assert_eq!(outcome["recommended_title"], "A Film Nobody Made");
}

#[tokio::test]
async fn test_recommendation_completion_failure() {
    let server = create_test_server(None);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "favorite_movie": "Inception" }))
        .await;

    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["failure_reason"], "completion_failed");

    let snapshot: Value = server.get("/api/v1/recommendations/state").await.json();
    assert_eq!(snapshot["state"], "errored");
    assert_eq!(snapshot["reason"], "completion_failed");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = create_test_server(Some("Interstellar"));
    let response = server.get("/health").await;
    let header = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_incoming_request_id_is_kept() {
    let server = create_test_server(Some("Interstellar"));
    let id = uuid::Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_str(&id).unwrap(),
        )
        .await;

    assert_eq!(response.header("x-request-id").to_str().unwrap(), id);
}

#[tokio::test]
async fn test_catalog_failure_does_not_leak_api_key() {
    // Nothing listens on the discard port
    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbClient::new(
        reqwest::Client::new(),
        ApiKey::new("tmdb-secret-key"),
        "http://127.0.0.1:9".to_string(),
        "en-US".to_string(),
    ));
    let server = create_server_with_catalog(Some("Interstellar"), catalog);

    for path in ["/api/v1/genres", "/api/v1/movies/157336", "/api/v1/movies"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::BAD_GATEWAY);
        assert!(!response.text().contains("tmdb-secret-key"), "key leaked by {}", path);
    }
}

#[tokio::test]
async fn test_genre_tiles() {
    let server = create_test_server(Some("Interstellar"));
    let tiles: Vec<String> = server.get("/api/v1/genres/tiles").await.json();
    assert_eq!(tiles.len(), 11);
    assert_eq!(tiles[0], "Action");
}

#[tokio::test]
async fn test_genres() {
    let server = create_test_server(Some("Interstellar"));
    let genres: Value = server.get("/api/v1/genres").await.json();
    assert_eq!(genres[0]["name"], "Adventure");
}

#[tokio::test]
async fn test_movie_details() {
    let server = create_test_server(Some("Interstellar"));

    let response = server.get("/api/v1/movies/157336").await;
    response.assert_status_ok();
    let details: Value = response.json();
    assert_eq!(details["title"], "Interstellar");
    assert_eq!(details["similar"].as_array().unwrap().len(), 25);

    let response = server.get("/api/v1/movies/1").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_browse_pagination() {
    let server = create_test_server(Some("Interstellar"));

    let first: Value = server
        .get("/api/v1/movies")
        .add_query_param("query", "interstellar")
        .await
        .json();
    assert_eq!(first["page"], 1);
    assert_eq!(first["has_more"], true);

    let second: Value = server
        .get("/api/v1/movies")
        .add_query_param("genre", "12")
        .add_query_param("page", "2")
        .await
        .json();
    assert_eq!(second["results"].as_array().unwrap().len(), 0);
    assert_eq!(second["has_more"], false);

    let response = server
        .get("/api/v1/movies")
        .add_query_param("page", "0")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
