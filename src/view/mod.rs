//! The dashboard view: polling state, display derivation, terminal drawing.

mod poller;
mod render;
mod state;

// ---

pub use poller::{poll_loop, HttpSource, ReadingsSource};
pub use render::{derive, draw, Dashboard, DeviceCard, TempBadge, SKELETON_CARDS};
pub use state::{FetchError, SharedViewState, ViewState};
