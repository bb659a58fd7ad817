//! Application entry point for the `sensordash` service.
//!
//! This binary orchestrates the full startup sequence for the dashboard:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Mounting the proxy and health routes via the `routes` gateway
//! - Binding the Axum HTTP server
//! - Mounting the terminal dashboard view, which polls the proxy on a fixed
//!   schedule until Ctrl-C unmounts it (skipped under `HEADLESS`)
//!
//! # Environment Variables
//! - `API_ENDPOINT` (**required**) – upstream sensor API URL
//! - `API_KEY` (**required**) – upstream secret credential
//! - `PORT` (optional) – listen port (default: 8080)
//! - `POLL_PERIOD_SECS` (optional) – dashboard poll period (default: 60)
//! - `HEADLESS` (optional) – serve the proxy only
//! - `SENSORDASH_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `SENSORDASH_SPAN_EVENTS` (optional) – span event mode for tracing

use std::env;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use sensordash::view::{self, HttpSource, SharedViewState, ViewState};
use sensordash::{config, routes, Config};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let client = reqwest::Client::new();
    let app = routes::router(client.clone(), cfg.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let cancel = CancellationToken::new();
    let server = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await
        })
    };

    if cfg.headless {
        tokio::signal::ctrl_c().await?;
        cancel.cancel();
    } else {
        run_dashboard(&cfg, client, cancel).await?;
    }

    server.await??;
    Ok(())
}

// ---

/// Mount the dashboard view until Ctrl-C.
///
/// Wires the poller (scheduled fetches against our own proxy route), a stdin
/// reader where every line is a manual refresh, and a redraw loop driven by
/// applied fetch completions. Cancelling the token unmounts everything.
async fn run_dashboard(cfg: &Config, client: reqwest::Client, cancel: CancellationToken) -> Result<()> {
    // ---
    let state: SharedViewState = Arc::new(Mutex::new(ViewState::new()));
    let (refresh_tx, refresh_rx) = mpsc::channel(4);
    let (updates_tx, mut updates_rx) = mpsc::channel(16);

    let poller = tokio::spawn(view::poll_loop(
        HttpSource::new(client, cfg.proxy_url()),
        Arc::clone(&state),
        Duration::from_secs(cfg.poll_period_secs),
        refresh_rx,
        cancel.clone(),
        updates_tx,
    ));

    // Every line on stdin is a manual refresh request.
    let stdin_cancel = cancel.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = stdin_cancel.cancelled() => break,
                line = lines.next_line() => match line {
                    Ok(Some(_)) => {
                        let _ = refresh_tx.send(()).await;
                    }
                    _ => break,
                },
            }
        }
    });

    let color = std::io::stdout().is_terminal();
    redraw(&state, color);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                break;
            }
            _ = cancel.cancelled() => break,
            Some(()) = updates_rx.recv() => redraw(&state, color),
        }
    }

    poller.await?;
    Ok(())
}

fn redraw(state: &SharedViewState, color: bool) {
    // ---
    let dashboard = view::derive(&state.lock().unwrap(), chrono::Utc::now());
    print!("{}", view::draw(&dashboard, color));
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// Configures [`tracing_subscriber`] with target/file/line output, color
/// controlled by TTY detection and `FORCE_COLOR`, span events via
/// `SENSORDASH_SPAN_EVENTS` (`full`, `enter_exit`, default close-only), and
/// the level via `RUST_LOG` or `SENSORDASH_LOG_LEVEL`. Called once at startup
/// before any logging macros.
fn init_tracing() {
    // ---
    let span_events = match env::var("SENSORDASH_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to SENSORDASH_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("SENSORDASH_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            // The dashboard shares stdout with the log stream, so stay quiet
            // by default.
            _ => "info",
        };
        EnvFilter::new(level.to_string())
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
