mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Context;
use coach::context::ContextBuilder;
use coach::providers::mistral::MistralProvider;
use coach::store::MemoryStore;
use configuration::Settings;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()?;
    let addr = settings
        .server
        .socket_addr()
        .context("Invalid server host or port")?;

    let store = MemoryStore::load(&settings.store.path)?;
    let provider_config = settings.provider.into_config();
    info!(model = %provider_config.model, host = %provider_config.host, "using Mistral provider");
    let provider = MistralProvider::new(provider_config)?;

    let web_search = settings.search.into_config();
    if web_search.api_key.is_none() {
        info!("web search disabled, no search API key configured");
    }

    let state = state::AppState::new(
        Arc::new(provider),
        ContextBuilder::new(Arc::new(store)),
        web_search,
    )?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
