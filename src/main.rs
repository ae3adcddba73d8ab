use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod routes;
mod services;
mod utils;

use api::{AlphaVantageClient, SeriesFetcher};
use config::Config;
use services::chart_service::{ArtifactNaming, ChartRenderer, PngChartRenderer};

/// Shared, read-only state handed to every request
pub struct AppState {
    pub config: Config,
    pub fetcher: Arc<dyn SeriesFetcher>,
    pub renderer: Arc<dyn ChartRenderer>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("stock_chart=debug,tower_http=info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting stock chart server...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    if !config.has_api_key() {
        warn!("ALPHAVANTAGE_API_KEY is not set; chart requests will be refused until it is");
    }
    match config.request_timeout {
        Some(timeout) => info!("Alpha Vantage requests time out after {:?}", timeout),
        None => info!("Alpha Vantage requests have no timeout"),
    }

    let client = match AlphaVantageClient::with_base_url(
        config.api_key.clone(),
        config.base_url.clone(),
        config.request_timeout,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create Alpha Vantage client: {}", e);
            return;
        }
    };

    let naming = if config.chart_per_request {
        ArtifactNaming::PerRequest
    } else {
        ArtifactNaming::Fixed
    };
    let renderer = PngChartRenderer::new(config.chart_dir(), naming).with_retention(config.chart_retain);
    info!("Charts are written to {} ({:?})", config.chart_dir().display(), naming);
    if config.chart_per_request {
        info!("Keeping the {} most recent charts", config.chart_retain);
    }

    let addr = config.bind_addr;
    let state = Arc::new(AppState {
        config,
        fetcher: Arc::new(client),
        renderer: Arc::new(renderer),
    });
    let app = routes::create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
