//! Requests understood by the remote control service

use serde::Serialize;

/// A single request to the remote control service
///
/// Serializes to the service's request shape, with the request name under
/// `"request-type"` and any arguments alongside it:
///
/// ```rust
/// use obs_client::Request;
///
/// let request = Request::SetCurrentScene { scene_name: "Intro".to_string() };
/// let json = serde_json::to_value(&request).unwrap();
///
/// assert_eq!(json["request-type"], "SetCurrentScene");
/// assert_eq!(json["scene-name"], "Intro");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "request-type")]
pub enum Request {
    GetCurrentScene,
    SetCurrentScene {
        #[serde(rename = "scene-name")]
        scene_name: String,
    },
    GetStreamingStatus,
    StartStreaming,
    StopStreaming,
    StartRecording,
    StopRecording,
}

impl Request {
    /// Name of the request as the service knows it
    pub fn request_type(&self) -> &'static str {
        match self {
            Request::GetCurrentScene => "GetCurrentScene",
            Request::SetCurrentScene { .. } => "SetCurrentScene",
            Request::GetStreamingStatus => "GetStreamingStatus",
            Request::StartStreaming => "StartStreaming",
            Request::StopStreaming => "StopStreaming",
            Request::StartRecording => "StartRecording",
            Request::StopRecording => "StopRecording",
        }
    }

    /// Whether the request changes state on the service
    pub fn is_command(&self) -> bool {
        !matches!(self, Request::GetCurrentScene | Request::GetStreamingStatus)
    }
}
