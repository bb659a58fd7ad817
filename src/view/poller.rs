//! Fetch scheduling for the dashboard view.
//!
//! One task owns the schedule: an immediate fetch on mount, a repeating timer
//! for the lifetime of the mount, and out-of-band manual refreshes. Cycles are
//! spawned rather than awaited in the loop, so a manual refresh can overlap a
//! scheduled poll; the sequence guard in `ViewState::apply` decides which
//! completion wins, and a cancellation check keeps completions that land after
//! unmount from touching state.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::{FetchError, SharedViewState};
use crate::models::Snapshot;

// ---

/// Where the poller gets its snapshots.
///
/// The production implementation talks to the proxy route over HTTP; tests
/// substitute scripted sources.
pub trait ReadingsSource: Clone + Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}

/// Fetches snapshots from the proxy endpoint.
#[derive(Clone)]
pub struct HttpSource {
    // ---
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        // ---
        Self {
            client,
            url: url.into(),
        }
    }
}

impl ReadingsSource for HttpSource {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        // ---
        let response = self
            .client
            .get(&self.url)
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<Snapshot>()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

// ---

/// Run the polling schedule until `cancel` fires.
///
/// The first fetch is issued immediately on entry, then every `period` for
/// the lifetime of the mount. Each message on `refresh` triggers one extra
/// cycle without resetting the timer. Applied completions are announced on
/// `updates` so the caller can redraw.
pub async fn poll_loop<S: ReadingsSource>(
    source: S,
    state: SharedViewState,
    period: Duration,
    mut refresh: mpsc::Receiver<()>,
    cancel: CancellationToken,
    updates: mpsc::Sender<()>,
) {
    // ---
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut next_seq: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Poll loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                next_seq += 1;
                spawn_cycle(&source, &state, &cancel, &updates, next_seq);
            }
            Some(()) = refresh.recv() => {
                debug!("Manual refresh requested");
                next_seq += 1;
                spawn_cycle(&source, &state, &cancel, &updates, next_seq);
            }
        }
    }
}

/// Issue one fetch cycle on its own task.
fn spawn_cycle<S: ReadingsSource>(
    source: &S,
    state: &SharedViewState,
    cancel: &CancellationToken,
    updates: &mpsc::Sender<()>,
    seq: u64,
) {
    // ---
    state.lock().unwrap().begin_fetch();

    let source = source.clone();
    let state = Arc::clone(state);
    let cancel = cancel.clone();
    let updates = updates.clone();

    tokio::spawn(async move {
        let outcome = source.fetch().await;

        // The view may have unmounted while the request was in flight.
        if cancel.is_cancelled() {
            debug!("Dropping fetch result that completed after unmount");
            return;
        }

        if state.lock().unwrap().apply(seq, outcome) {
            let _ = updates.try_send(());
        }
    });
}
