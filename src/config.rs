//! Configuration loader for the `sensordash` service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). Consolidating the `env::var` calls here
//! keeps the rest of the codebase free of ad hoc environment lookups.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Upstream sensor API URL.
    pub api_endpoint: String,

    /// Secret credential sent to the upstream as the `x-api-key` header.
    /// Never forwarded to dashboard clients.
    pub api_key: String,

    /// Port the proxy listens on.
    pub port: u16,

    /// Seconds between scheduled dashboard polls.
    pub poll_period_secs: u64,

    /// Serve the proxy only, without the terminal dashboard.
    pub headless: bool,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `API_ENDPOINT` – upstream sensor API URL
/// - `API_KEY` – upstream secret credential
///
/// Optional:
/// - `PORT` – listen port (default: 8080)
/// - `POLL_PERIOD_SECS` – dashboard poll period (default: 60)
/// - `HEADLESS` – `1`/`true`/`yes` to disable the terminal dashboard
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_endpoint = require_env!("API_ENDPOINT");
    let api_key = require_env!("API_KEY");
    let port = parse_env!("PORT", u16, 8080);
    let poll_period_secs = parse_env!("POLL_PERIOD_SECS", u64, 60);

    let headless = matches!(
        env::var("HEADLESS").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    );

    Ok(Config {
        api_endpoint,
        api_key,
        port,
        poll_period_secs,
        headless,
    })
}

impl Config {
    /// URL of the local proxy route the dashboard polls.
    pub fn proxy_url(&self) -> String {
        // ---
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the API key while showing all other values that were loaded.
    pub fn log_config(&self) {
        // ---
        let masked_key = if self.api_key.len() > 4 {
            format!("{}****", &self.api_key[..2])
        } else {
            "****".to_string()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  API_ENDPOINT     : {}", self.api_endpoint);
        tracing::info!("  API_KEY          : {}", masked_key);
        tracing::info!("  PORT             : {}", self.port);
        tracing::info!("  POLL_PERIOD_SECS : {}", self.poll_period_secs);
        tracing::info!("  HEADLESS         : {}", self.headless);
    }
}
