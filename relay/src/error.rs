//! Errors the relay produces on its own behalf.
//!
//! Anything the upstream API reports is passed through untouched and never
//! becomes a `RelayError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::api::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed. POST only.")]
    MethodNotAllowed,

    #[error("API key not configured. Set ANTHROPIC_API_KEY in the server environment.")]
    MissingApiKey,

    #[error("Empty request body")]
    EmptyBody,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Connection, TLS, timeout or body read failure talking to the upstream.
    #[error("Curl error: {}", error_chain(.0))]
    Transport(#[from] reqwest::Error),
}

/// Render an error and every `source()` beneath it, joined with ": ".
///
/// reqwest's own message only names the URL; the cause (refused connection,
/// DNS failure, TLS handshake) lives further down the chain.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::EmptyBody | RelayError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            RelayError::MissingApiKey | RelayError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            RelayError::MissingApiKey => {
                tracing::error!("Relay request rejected: ANTHROPIC_API_KEY is not configured");
            }
            RelayError::Transport(e) => {
                tracing::error!("Upstream transport error: {}", error_chain(e));
            }
            RelayError::InvalidJson(e) => {
                tracing::warn!("JSON parse error: {}", e);
            }
            RelayError::MethodNotAllowed | RelayError::EmptyBody => {}
        }

        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
