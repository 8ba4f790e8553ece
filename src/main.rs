// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::charts_service::ChartsService;
use crate::application::live_feed_service::LiveFeedService;
use crate::application::selection_store::{InMemorySelectionStore, SelectionStore};
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::file_selection_store::JsonFileSelectionStore;
use crate::infrastructure::http_api::HttpTelemetryApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Upstream API client and selection persistence (infrastructure layer)
    let api = Arc::new(HttpTelemetryApi::new(
        &config.api.base_url,
        config.api.timeout(),
    )?);
    let selections: Arc<dyn SelectionStore> = match &config.selection.path {
        Some(path) => Arc::new(JsonFileSelectionStore::open(path)?),
        None => Arc::new(InMemorySelectionStore::new()),
    };

    // Create services (application layer)
    let charts_service = ChartsService::new(api, selections);
    let live_feed = LiveFeedService::new(config.live.window);

    let state = Arc::new(AppState {
        charts_service,
        live_feed,
    });

    // Build router (presentation layer)
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(
        "Starting house-telemetry dashboard on {} (API {})",
        addr,
        config.api.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
