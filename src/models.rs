//! Wire types shared by the proxy and the dashboard view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// One device's reported values, as the upstream API serializes them.
///
/// `time_stamp` stays a raw string on purpose: an absent or unparsable
/// timestamp is valid data (the reading is simply treated as stale), so
/// parsing is deferred to the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    // ---
    pub device_name: String,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<String>,
}

/// The readings returned by one successful poll. Replaces the previous
/// snapshot wholesale; nothing is merged or retained across polls.
pub type Snapshot = Vec<SensorReading>;

impl SensorReading {
    /// The reading's timestamp parsed as RFC 3339, if present and well formed.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        // ---
        self.time_stamp.as_deref().and_then(parse_iso)
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC.
pub(crate) fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    // ---
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_deserializes_upstream_wire_format() {
        // ---
        let json = r#"{"deviceName":"greenhouse-1","temperature":21.5,"humidity":48.0,"timeStamp":"2026-08-07T10:00:00Z"}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.device_name, "greenhouse-1");
        assert_eq!(reading.temperature, 21.5);
        assert_eq!(reading.humidity, 48.0);
        assert_eq!(
            reading.parsed_timestamp(),
            Some(Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_timestamp_is_optional() {
        // ---
        let json = r#"{"deviceName":"A","temperature":25,"humidity":40}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.time_stamp, None);
        assert_eq!(reading.parsed_timestamp(), None);
    }

    #[test]
    fn test_garbage_timestamp_parses_to_none() {
        // ---
        let reading = SensorReading {
            device_name: "A".to_string(),
            temperature: 25.0,
            humidity: 40.0,
            time_stamp: Some("not-a-date".to_string()),
        };

        assert_eq!(reading.parsed_timestamp(), None);
    }

    #[test]
    fn test_offset_timestamps_normalize_to_utc() {
        // ---
        let reading = SensorReading {
            device_name: "A".to_string(),
            temperature: 25.0,
            humidity: 40.0,
            time_stamp: Some("2026-08-07T12:00:00+02:00".to_string()),
        };

        assert_eq!(
            reading.parsed_timestamp(),
            Some(Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_serializes_back_in_camel_case() {
        // ---
        let reading = SensorReading {
            device_name: "A".to_string(),
            temperature: 25.0,
            humidity: 40.0,
            time_stamp: None,
        };

        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(json, r#"{"deviceName":"A","temperature":25.0,"humidity":40.0}"#);
    }
}
