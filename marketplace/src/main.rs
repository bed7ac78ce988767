//! Marketplace HTTP server.
//!
//! Supper-club marketplace backend: event publishing, collaboration
//! matching, seat inventory, and guest recommendations.

use std::sync::Arc;
use std::time::Duration;
use supperclub_core::environment::{RandomIds, SystemClock};
use supperclub_marketplace::app::MarketplaceService;
use supperclub_marketplace::config::Config;
use supperclub_marketplace::media::StockPhotoClient;
use supperclub_marketplace::recommendations::HttpRankingService;
use supperclub_marketplace::server::{AppState, build_router};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "supperclub_marketplace=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting marketplace HTTP server");

    // Load configuration
    let config = Config::from_env();
    info!(
        host = %config.server.host,
        port = config.server.port,
        ranking_configured = config.ranking.url.is_some(),
        photos_configured = config.photos.api_key.is_some(),
        "Configuration loaded"
    );

    // Build the marketplace service
    let clock = Arc::new(SystemClock);
    let ids = Arc::new(RandomIds);
    let mut service = MarketplaceService::new(clock, ids);

    if let Some(url) = config.ranking.url.clone() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ranking.timeout))
            .build()?;
        service = service.with_ranking(Arc::new(HttpRankingService::new(client, url)));
        info!("External ranking service configured");
    }

    if let Some(api_key) = config.photos.api_key.clone() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.photos.timeout))
            .build()?;
        service = service.with_photos(Arc::new(StockPhotoClient::new(
            client,
            config.photos.base_url.clone(),
            api_key,
        )));
        info!("Photo search provider configured");
    }

    // Build router
    let state = AppState::new(Arc::new(service));
    let app = build_router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
