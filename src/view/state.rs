//! Polling state owned by the dashboard view.
//!
//! The view moves through four states: `Initializing` (loading, nothing held
//! yet), `Loading` (loading with prior data/error retained), `Success`
//! (snapshot held, error cleared) and `Failure` (error held, prior snapshot
//! retained). An error is authoritative for rendering; a retained snapshot is
//! not shown while one is active.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::models::Snapshot;

// ---

/// A dashboard-side fetch failure, shown verbatim in the error panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The proxy answered outside 200-299.
    Status(u16),
    /// The request failed before a usable response arrived.
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(msg) if msg.is_empty() => write!(f, "Failed to fetch"),
            Self::Transport(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

// ---

/// Mutable view state, alive from mount to unmount.
///
/// Only fetch-cycle completions write here, through [`ViewState::apply`].
/// Cycles may overlap (a manual refresh racing a scheduled poll), so each one
/// carries an issue-time sequence number and `apply` drops any completion
/// that would roll the state back behind a newer one.
#[derive(Debug, Default)]
pub struct ViewState {
    // ---
    data: Option<Snapshot>,
    error: Option<String>,
    loading: bool,
    applied_seq: Option<u64>,
}

/// The view state as shared between the poller and the renderer.
pub type SharedViewState = Arc<Mutex<ViewState>>;

impl ViewState {
    /// Fresh `Initializing` state: loading, nothing held yet.
    pub fn new() -> Self {
        // ---
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// A fetch cycle has been issued.
    pub fn begin_fetch(&mut self) {
        // ---
        self.loading = true;
    }

    /// Apply a completed fetch cycle.
    ///
    /// `seq` is the cycle's issue-time sequence number. Completions arriving
    /// out of order (an earlier-issued cycle resolving after a later one) are
    /// dropped. Returns whether the state changed.
    ///
    /// A success replaces the snapshot and clears the error; a failure sets
    /// the error but keeps the prior snapshot. Loading ends either way.
    pub fn apply(&mut self, seq: u64, outcome: Result<Snapshot, FetchError>) -> bool {
        // ---
        self.loading = false;

        if self.applied_seq.is_some_and(|applied| seq <= applied) {
            return false;
        }
        self.applied_seq = Some(seq);

        match outcome {
            Ok(snapshot) => {
                self.data = Some(snapshot);
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Last successful snapshot, if any fetch has succeeded yet.
    pub fn data(&self) -> Option<&Snapshot> {
        self.data.as_ref()
    }

    /// Message of the most recent failure, until a fetch succeeds again.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a fetch cycle is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
