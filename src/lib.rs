//! `sensordash`: a thin live dashboard over a remote sensor API.
//!
//! The crate has two halves, composed in strict dependency order:
//!
//! - [`routes`] serves `GET /api`, a stateless proxy that forwards one request
//!   to the upstream sensor API with the secret key attached server-side and
//!   relays the JSON payload (or a normalized error envelope) back,
//!   non-cacheable.
//! - [`view`] is the dashboard itself: a polling state machine that fetches
//!   the proxy every 60 seconds (plus manual refreshes), and a pure display
//!   derivation that turns the latest state into per-device cards with
//!   temperature badges, humidity bars and staleness highlighting.
//!
//! Readings are transient. Each successful poll replaces the previous
//! snapshot wholesale; nothing is persisted, merged or retained.

pub mod config;
pub mod models;
pub mod routes;
pub mod view;

pub use config::Config;
pub use models::{SensorReading, Snapshot};
