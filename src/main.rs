use std::sync::Arc;

mod analysis;
mod api;
mod config;
mod domain;
mod generator;
mod models;
mod perplexity;
mod prompt;

use analysis::Analyzer;
use api::AppState;
use config::Settings;
use perplexity::PerplexityClient;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let settings = Settings::from_env().map_err(|e| {
        tracing::error!("invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    if settings.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        tracing::warn!("PERPLEXITY_API_KEY is not set; analysis requests will fail");
    }

    let client = PerplexityClient::new(&settings.api_base, settings.request_timeout)
        .map_err(std::io::Error::other)?;
    tracing::info!(endpoint = %client.endpoint(), model = %settings.model, "generation client ready");

    let analyzer = Analyzer::new(settings.api_key, settings.model, Arc::new(client));
    let app = api::router(AppState {
        analyzer: Arc::new(analyzer),
    });

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
