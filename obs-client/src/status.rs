//! Stream status snapshots

use serde_json::{Map, Value};

/// Snapshot of the service's recording and streaming activity
///
/// Equality is equality of the raw payload. That is the only comparison the
/// connection manager performs when deciding whether status changed between
/// two polls, so a ticking timecode counts as a change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamStatus {
    payload: Map<String, Value>,
}

impl StreamStatus {
    /// Wrap a raw status payload
    pub fn from_payload(payload: Map<String, Value>) -> Self {
        Self { payload }
    }

    /// Raw payload as returned by the service
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Whether the service is currently streaming
    pub fn is_streaming(&self) -> bool {
        self.flag("streaming")
    }

    /// Whether the service is currently recording
    pub fn is_recording(&self) -> bool {
        self.flag("recording")
    }

    /// Elapsed streaming time, e.g. `"00:01:02.345"`
    pub fn stream_timecode(&self) -> Option<&str> {
        self.payload.get("stream-timecode").and_then(Value::as_str)
    }

    /// Elapsed recording time, e.g. `"00:01:02.345"`
    pub fn rec_timecode(&self) -> Option<&str> {
        self.payload.get("rec-timecode").and_then(Value::as_str)
    }

    /// Drop the fractional seconds from a timecode for display
    ///
    /// ```rust
    /// use obs_client::StreamStatus;
    ///
    /// assert_eq!(StreamStatus::display_timecode("01:02:03.456"), "01:02:03");
    /// assert_eq!(StreamStatus::display_timecode("01:02:03"), "01:02:03");
    /// ```
    pub fn display_timecode(timecode: &str) -> &str {
        timecode
            .rsplit_once('.')
            .map_or(timecode, |(whole, _)| whole)
    }

    fn flag(&self, key: &str) -> bool {
        self.payload
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl From<Map<String, Value>> for StreamStatus {
    fn from(payload: Map<String, Value>) -> Self {
        Self::from_payload(payload)
    }
}
