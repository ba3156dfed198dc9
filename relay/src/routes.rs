use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::handlers::{health, proxy};
use crate::upstream::UpstreamClient;

/// Base64-encoded PDFs make request bodies far larger than axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: RelayConfig) -> reqwest::Result<Self> {
        let upstream = UpstreamClient::new(config.upstream_url.clone())?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Every method reaches the relay so it can answer 405 itself
        .route("/api/claude-proxy", any(proxy::relay_messages))
}

pub fn create_app(state: AppState) -> Router {
    api_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
