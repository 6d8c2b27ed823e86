use std::sync::Arc;

use cinematch_api::{
    api::{create_router, AppState},
    config::Config,
    services::{
        providers::{openai::OpenAiClient, tmdb::TmdbClient},
        CatalogProvider, CompletionProvider, PipelineSettings, RecommendationPipeline,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinematch_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let http_client = reqwest::Client::builder()
        .timeout(config.stage_timeout())
        .build()?;

    let completion: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::new(
        http_client.clone(),
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.completion_model.clone(),
    ));
    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbClient::new(
        http_client,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.related_language.clone(),
    ));

    let pipeline = Arc::new(RecommendationPipeline::new(
        completion,
        catalog.clone(),
        PipelineSettings::from(&config),
    ));

    let app = create_router(AppState::new(pipeline, catalog));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
