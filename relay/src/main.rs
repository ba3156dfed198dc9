mod config;
mod error;
mod handlers;
mod routes;
mod upstream;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::RelayConfig;
use crate::routes::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = RelayConfig::from_env()?;

    tracing::info!(
        "Starting {} {} relay",
        shared::APP_NAME,
        shared::APP_VERSION
    );

    if config.api_key.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, relay requests will fail until it is configured");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config).context("Failed to build upstream HTTP client")?;
    tracing::info!("Forwarding to {}", state.upstream.messages_url());

    let app = create_app(state);

    // Run server
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
