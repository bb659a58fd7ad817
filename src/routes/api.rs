//! The proxy route the dashboard polls.
//!
//! `GET /api` forwards one request to the upstream sensor API with the secret
//! key attached, so the credential never reaches a dashboard client, and
//! relays the payload back. Upstream failures are normalized into a stable
//! JSON error envelope. Every response is marked non-cacheable so each poll
//! reaches the upstream.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::Config;

// ---

pub fn router() -> Router<(Client, Config)> {
    // ---
    Router::new().route("/api", get(handler))
}

async fn handler(State((client, config)): State<(Client, Config)>) -> Response {
    // ---
    debug!("GET /api - forwarding to upstream");

    match forward(&client, &config).await {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            ],
            body,
        )
            .into_response(),
        Err(UpstreamError::Status(status)) => {
            warn!("Upstream answered {}", status);
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                [(header::CACHE_CONTROL, "no-store")],
                Json(json!({ "error": format!("Upstream error ({status})") })),
            )
                .into_response()
        }
        Err(UpstreamError::Transport(e)) => {
            // The cause stays in the server log; clients get a generic message.
            error!("Upstream request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CACHE_CONTROL, "no-store")],
                Json(json!({ "error": "Failed to fetch upstream API" })),
            )
                .into_response()
        }
    }
}

// ---

enum UpstreamError {
    /// Upstream responded outside 200-299.
    Status(u16),
    /// The request never produced a usable response.
    Transport(reqwest::Error),
}

/// Issue the single upstream attempt. No retry; the scheduled poll is the
/// retry mechanism. A 2xx body is returned untouched so the client sees
/// exactly what the upstream produced.
async fn forward(client: &Client, config: &Config) -> Result<String, UpstreamError> {
    // ---
    let response = client
        .get(&config.api_endpoint)
        .header("x-api-key", config.api_key.as_str())
        .header("cache-control", "no-cache")
        .send()
        .await
        .map_err(UpstreamError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }

    response.text().await.map_err(UpstreamError::Transport)
}
