//! The credentialed relay endpoint.
//!
//! Validates the inbound request, forwards the raw body upstream with the
//! server-side API key attached, and mirrors the upstream status and body.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::{RelayError, RelayResult};
use crate::routes::AppState;

pub async fn relay_messages(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> RelayResult<Response> {
    // CORS preflight
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    if method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let api_key = state
        .config
        .api_key
        .as_ref()
        .ok_or(RelayError::MissingApiKey)?;

    if body.is_empty() {
        return Err(RelayError::EmptyBody);
    }

    // Parsed only to validate; the original bytes are what gets forwarded.
    serde_json::from_slice::<serde_json::Value>(&body)?;

    tracing::debug!(bytes = body.len(), "Forwarding request upstream");

    let upstream = state.upstream.forward(api_key, body).await?;

    tracing::info!(
        status = upstream.status.as_u16(),
        bytes = upstream.body.len(),
        "Upstream responded"
    );

    Ok((upstream.status, Body::from(upstream.body)).into_response())
}
