//! Responses returned by the remote control service

use serde_json::{Map, Value};

use crate::error::{ClientError, Result};
use crate::status::StreamStatus;

/// Raw response payload for a single request
///
/// The service answers every request with a flat JSON object; accessors
/// pull out the fields the SDK cares about.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    payload: Map<String, Value>,
}

impl Response {
    /// Wrap a raw payload
    pub fn new(payload: Map<String, Value>) -> Self {
        Self { payload }
    }

    /// Parse a payload from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(payload) => Ok(Self { payload }),
            other => Err(ClientError::Parse(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// Raw payload
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// String field by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Scene name carried by a GetCurrentScene response
    pub fn scene_name(&self) -> Result<String> {
        self.get_str("name")
            .map(str::to_string)
            .ok_or_else(|| ClientError::Parse("missing scene name".to_string()))
    }

    /// Interpret the payload as a stream status snapshot
    pub fn into_stream_status(self) -> StreamStatus {
        StreamStatus::from_payload(self.payload)
    }
}

impl From<Map<String, Value>> for Response {
    fn from(payload: Map<String, Value>) -> Self {
        Self::new(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scene_name() {
        let response = Response::from_value(json!({ "name": "Intro", "sources": [] })).unwrap();
        assert_eq!(response.scene_name().unwrap(), "Intro");
    }

    #[test]
    fn test_scene_name_missing() {
        let response = Response::from_value(json!({ "sources": [] })).unwrap();
        assert!(matches!(response.scene_name(), Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let result = Response::from_value(json!(["not", "an", "object"]));
        assert!(matches!(result, Err(ClientError::Parse(_))));
    }

    #[test]
    fn test_into_stream_status_keeps_payload() {
        let response = Response::from_value(json!({ "recording": true })).unwrap();
        let status = response.clone().into_stream_status();
        assert_eq!(status.payload(), response.payload());
        assert!(status.is_recording());
    }
}
