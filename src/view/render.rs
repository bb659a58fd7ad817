//! Display derivation for the dashboard.
//!
//! Everything here is a pure function of the view state and a reference
//! instant; drawing consumes the derived model and is the only place ANSI
//! escapes appear.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::state::ViewState;
use crate::models::{parse_iso, SensorReading};

// ---

/// Placeholder cards shown before the first snapshot arrives.
pub const SKELETON_CARDS: usize = 4;

/// Readings older than this are flagged stale.
const STALE_AFTER_MS: i64 = 60 * 60 * 1000;

/// Cells in the drawn humidity bar track.
const BAR_CELLS: usize = 20;

// ---

/// Categorical temperature badge. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBadge {
    Hot,
    Warm,
    Cool,
}

impl TempBadge {
    pub fn classify(temperature: f64) -> Self {
        // ---
        if temperature >= 30.0 {
            Self::Hot
        } else if temperature >= 20.0 {
            Self::Warm
        } else {
            Self::Cool
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hot => "Hot",
            Self::Warm => "Warm",
            Self::Cool => "Cool",
        }
    }

    pub fn color_hint(&self) -> &'static str {
        match self {
            Self::Hot => "red",
            Self::Warm => "amber",
            Self::Cool => "green",
        }
    }
}

// ---

/// Visual width of the humidity bar, clamped to the 0-100 track.
/// The printed number is left as reported.
pub fn bar_width(humidity: f64) -> f64 {
    // ---
    humidity.clamp(0.0, 100.0)
}

/// Human-readable age of a reading's timestamp relative to `now`.
///
/// Absent or unparsable timestamps display as an em dash. Ages under a day
/// are relative ("just now", "45s ago", "5m ago", "3h ago", floored); older
/// readings show the absolute date in day/month/year order.
pub fn format_timestamp(time_stamp: Option<&str>, now: DateTime<Utc>) -> String {
    // ---
    let Some(ts) = time_stamp.and_then(parse_iso) else {
        return "—".to_string();
    };

    let sec = (now - ts).num_seconds();
    if sec < 5 {
        return "just now".to_string();
    }
    if sec < 60 {
        return format!("{sec}s ago");
    }
    let min = sec / 60;
    if min < 60 {
        return format!("{min}m ago");
    }
    let hr = min / 60;
    if hr < 24 {
        return format!("{hr}h ago");
    }
    ts.format("%d/%m/%Y").to_string()
}

/// Whether a reading counts as stale: timestamp absent, unparsable, or more
/// than an hour behind `now`. Independent of how the timestamp is formatted.
pub fn is_stale(time_stamp: Option<&str>, now: DateTime<Utc>) -> bool {
    // ---
    match time_stamp.and_then(parse_iso) {
        Some(ts) => (now - ts).num_milliseconds() > STALE_AFTER_MS,
        None => true,
    }
}

// ---

/// One rendered device card.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCard {
    // ---
    pub device_name: String,
    pub temperature: f64,
    pub badge: TempBadge,
    pub humidity: f64,
    pub bar_width: f64,
    pub timestamp: String,
    pub stale: bool,
}

impl DeviceCard {
    fn from_reading(reading: &SensorReading, now: DateTime<Utc>) -> Self {
        // ---
        Self {
            device_name: reading.device_name.clone(),
            temperature: reading.temperature,
            badge: TempBadge::classify(reading.temperature),
            humidity: reading.humidity,
            bar_width: bar_width(reading.humidity),
            timestamp: format_timestamp(reading.time_stamp.as_deref(), now),
            stale: is_stale(reading.time_stamp.as_deref(), now),
        }
    }
}

/// What the dashboard shows for a given view state.
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    /// A fetch failed; the message replaces the card grid until a retry
    /// succeeds.
    Error { message: String },
    /// No snapshot yet; placeholder slots.
    Skeleton { slots: usize },
    Cards(Vec<DeviceCard>),
}

/// Derive the display model. An active error is authoritative: a retained
/// snapshot is not rendered behind it.
pub fn derive(state: &ViewState, now: DateTime<Utc>) -> Dashboard {
    // ---
    if let Some(message) = state.error() {
        return Dashboard::Error {
            message: message.to_string(),
        };
    }
    match state.data() {
        Some(snapshot) => Dashboard::Cards(
            snapshot
                .iter()
                .map(|r| DeviceCard::from_reading(r, now))
                .collect(),
        ),
        None => Dashboard::Skeleton {
            slots: SKELETON_CARDS,
        },
    }
}

// ---

/// Draw a derived dashboard as one terminal frame. ANSI color is applied
/// only when `color` is set.
pub fn draw(dashboard: &Dashboard, color: bool) -> String {
    // ---
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint("Sensors", "1", color));

    match dashboard {
        Dashboard::Error { message } => {
            let _ = writeln!(out, "  {}", paint(&format!("Error: {message}"), "31", color));
            let _ = writeln!(out, "  Press Enter to retry.");
        }
        Dashboard::Skeleton { slots } => {
            for _ in 0..*slots {
                let _ = writeln!(out, "  {}", paint("░░░░░░░░░░░░░░░░░░░░", "2", color));
            }
        }
        Dashboard::Cards(cards) => {
            for card in cards {
                let badge_code = match card.badge {
                    TempBadge::Hot => "31",
                    TempBadge::Warm => "33",
                    TempBadge::Cool => "32",
                };
                let caption_code = if card.stale { "31" } else { "2" };

                let _ = writeln!(out, "  {}", paint(&card.device_name, "1", color));
                let _ = writeln!(
                    out,
                    "    {}°C  {}",
                    card.temperature,
                    paint(card.badge.label(), badge_code, color),
                );
                let _ = writeln!(
                    out,
                    "    humidity [{}] {}%",
                    humidity_bar(card.bar_width),
                    card.humidity,
                );
                let _ = writeln!(out, "    {}", paint(&card.timestamp, caption_code, color));
            }
        }
    }

    out
}

fn humidity_bar(width: f64) -> String {
    // ---
    let filled = ((width / 100.0) * BAR_CELLS as f64).round() as usize;
    let filled = filled.min(BAR_CELLS);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

fn paint(text: &str, code: &str, color: bool) -> String {
    // ---
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}
