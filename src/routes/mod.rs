use axum::Router;
use reqwest::Client;

use crate::Config;

mod api;
mod health;

// ---

pub fn router(client: Client, config: Config) -> Router {
    // ---
    Router::new()
        .merge(api::router())
        .merge(health::router())
        .with_state((client, config))
}
