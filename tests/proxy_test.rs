//! End-to-end tests for the HTTP surface: the real router served on an
//! ephemeral port, talking to an in-process stub upstream.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use sensordash::{routes, Config};

const TEST_KEY: &str = "test-key";

// ---

async fn serve(app: Router) -> Result<SocketAddr> {
    // ---
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(addr)
}

fn config_for(upstream: SocketAddr) -> Config {
    // ---
    Config {
        api_endpoint: format!("http://{upstream}/readings"),
        api_key: TEST_KEY.to_string(),
        port: 0,
        poll_period_secs: 60,
        headless: true,
    }
}

async fn spawn_proxy(upstream: SocketAddr) -> Result<SocketAddr> {
    // ---
    serve(routes::router(reqwest::Client::new(), config_for(upstream))).await
}

/// Stub upstream: rejects requests without the secret key, otherwise answers
/// with one fixed reading.
async fn upstream_ok(headers: HeaderMap) -> impl IntoResponse {
    // ---
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "missing key" }))).into_response();
    }
    Json(json!([{ "deviceName": "A", "temperature": 25, "humidity": 40 }])).into_response()
}

async fn upstream_unavailable() -> impl IntoResponse {
    // ---
    (StatusCode::SERVICE_UNAVAILABLE, "upstream down")
}

// ---

#[tokio::test]
async fn test_relays_upstream_body_verbatim() -> Result<()> {
    // ---
    // The stub 401s without the key, so a 200 here also proves the proxy
    // attached `x-api-key` server-side.
    let upstream = serve(Router::new().route("/readings", get(upstream_ok))).await?;
    let proxy = spawn_proxy(upstream).await?;

    let res = reqwest::get(format!("http://{proxy}/api")).await?;

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store, no-cache, must-revalidate")
    );

    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!([{ "deviceName": "A", "temperature": 25, "humidity": 40 }])
    );
    Ok(())
}

#[tokio::test]
async fn test_upstream_error_relayed_with_same_status() -> Result<()> {
    // ---
    let upstream = serve(Router::new().route("/readings", get(upstream_unavailable))).await?;
    let proxy = spawn_proxy(upstream).await?;

    let res = reqwest::get(format!("http://{proxy}/api")).await?;

    assert_eq!(res.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        res.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Upstream error (503)" }));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_upstream_maps_to_500() -> Result<()> {
    // ---
    // Grab an ephemeral port and release it so nothing is listening there.
    let unreachable = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        listener.local_addr()?
    };
    let proxy = spawn_proxy(unreachable).await?;

    let res = reqwest::get(format!("http://{proxy}/api")).await?;

    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "error": "Failed to fetch upstream API" }));
    Ok(())
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    // ---
    // Health never touches the upstream; an unreachable one is fine.
    let unreachable = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        listener.local_addr()?
    };
    let proxy = spawn_proxy(unreachable).await?;

    let res = reqwest::get(format!("http://{proxy}/health")).await?;

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}
