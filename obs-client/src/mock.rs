//! Scriptable in-memory transport for tests
//!
//! `MockTransport` behaves like a reachable service by default: connects
//! succeed, the current scene is `"Scene"`, and every status poll answers
//! with an idle status. Tests reshape it through the setters below and
//! inspect what the SDK sent through [`MockTransport::calls`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::error::{ClientError, Result};
use crate::request::Request;
use crate::response::Response;
use crate::transport::{PushEvent, PushHandler, Transport};

#[derive(Debug)]
struct StatusScript {
    pending: VecDeque<Map<String, Value>>,
    last: Map<String, Value>,
}

/// Mock transport for testing that doesn't open any socket
pub struct MockTransport {
    reachable: AtomicBool,
    connected: AtomicBool,
    unexpected_connect_errors: AtomicUsize,
    scene_fetch_failures: AtomicUsize,
    connect_attempts: AtomicUsize,
    disconnects: AtomicUsize,
    scene: Mutex<String>,
    statuses: Mutex<StatusScript>,
    calls: Mutex<Vec<Request>>,
    push_handler: Mutex<Option<PushHandler>>,
}

impl MockTransport {
    /// Create a reachable mock whose current scene is `"Scene"`
    pub fn new() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            unexpected_connect_errors: AtomicUsize::new(0),
            scene_fetch_failures: AtomicUsize::new(0),
            connect_attempts: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            scene: Mutex::new("Scene".to_string()),
            statuses: Mutex::new(StatusScript {
                pending: VecDeque::new(),
                last: as_object(json!({ "streaming": false, "recording": false })),
            }),
            calls: Mutex::new(Vec::new()),
            push_handler: Mutex::new(None),
        }
    }

    /// Create an unreachable mock; every connect fails until made reachable
    pub fn unreachable() -> Self {
        let mock = Self::new();
        mock.set_reachable(false);
        mock
    }

    /// Builder-style scene setter
    pub fn with_scene(self, scene: &str) -> Self {
        self.set_scene(scene);
        self
    }

    /// Control whether connect attempts succeed
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Simulate the service closing the connection
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Set the scene reported by GetCurrentScene, without a push event
    pub fn set_scene(&self, scene: &str) {
        *self.scene.lock() = scene.to_string();
    }

    /// Queue status payloads to answer the next polls with, in order
    ///
    /// Once the queue is drained the last payload keeps being returned.
    /// Non-object values are treated as an empty payload.
    pub fn script_statuses<I>(&self, statuses: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let mut script = self.statuses.lock();
        script.pending.extend(statuses.into_iter().map(as_object));
    }

    /// Make the next `count` connect attempts fail with an error that is
    /// not a connection failure
    pub fn fail_connects_unexpectedly(&self, count: usize) {
        self.unexpected_connect_errors.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` GetCurrentScene requests fail
    pub fn fail_scene_fetches(&self, count: usize) {
        self.scene_fetch_failures.store(count, Ordering::SeqCst);
    }

    /// Simulate the service pushing a scene switch
    ///
    /// Returns `false` if no push handler is installed.
    pub fn emit_scene_switch(&self, scene: &str) -> bool {
        self.set_scene(scene);
        let handler = self.push_handler.lock().clone();
        match handler {
            Some(handler) => {
                handler(PushEvent::SceneSwitched {
                    scene_name: scene.to_string(),
                });
                true
            }
            None => false,
        }
    }

    /// Every request received while connected, in order
    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().clone()
    }

    /// Requests that change state on the service, in order
    pub fn commands(&self) -> Vec<Request> {
        self.calls
            .lock()
            .iter()
            .filter(|r| r.is_command())
            .cloned()
            .collect()
    }

    /// Number of GetStreamingStatus requests answered
    pub fn status_polls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|r| **r == Request::GetStreamingStatus)
            .count()
    }

    /// Number of queued status payloads not yet returned
    pub fn pending_statuses(&self) -> usize {
        self.statuses.lock().pending.len()
    }

    /// Number of connect attempts, successful or not
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of disconnect calls
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Whether a push handler is currently installed
    pub fn has_push_handler(&self) -> bool {
        self.push_handler.lock().is_some()
    }

    fn next_status(&self) -> Map<String, Value> {
        let mut script = self.statuses.lock();
        if let Some(next) = script.pending.pop_front() {
            script.last = next;
        }
        script.last.clone()
    }

    fn take_one(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn connect(&self) -> Result<()> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if Self::take_one(&self.unexpected_connect_errors) {
            return Err(ClientError::Parse("unexpected handshake reply".to_string()));
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(ClientError::ConnectionFailure(
                "connection refused".to_string(),
            ));
        }

        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn call(&self, request: &Request) -> Result<Response> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        self.calls.lock().push(request.clone());

        match request {
            Request::GetCurrentScene => {
                if Self::take_one(&self.scene_fetch_failures) {
                    return Err(ClientError::RequestFailed {
                        request: request.request_type(),
                        message: "scene list unavailable".to_string(),
                    });
                }
                let scene = self.scene.lock().clone();
                Ok(Response::new(as_object(json!({ "name": scene }))))
            }
            Request::SetCurrentScene { scene_name } => {
                self.set_scene(scene_name);
                Ok(Response::default())
            }
            Request::GetStreamingStatus => Ok(Response::new(self.next_status())),
            Request::StartStreaming
            | Request::StopStreaming
            | Request::StartRecording
            | Request::StopRecording => Ok(Response::default()),
        }
    }

    fn set_push_handler(&self, handler: Option<PushHandler>) {
        *self.push_handler.lock() = handler;
    }
}

fn as_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
