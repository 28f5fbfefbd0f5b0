//! Connection manager owning the transport, the worker and the event bus

use std::sync::Arc;

use event_bus::EventBus;
use obs_client::{Request, StreamStatus, Transport};
use parking_lot::Mutex;

use crate::config::ManagerConfig;
use crate::error::{ConnectionError, Result};
use crate::event::{EventHandler, EventKind, ObsEvent};
use crate::worker::{
    is_worker_thread_for, push_handler, spawn_connection_worker, SharedState, WorkerContext,
    WorkerHandle,
};

/// Keeps one connection to OBS alive and mirrors its state locally
///
/// `start()` spawns a background worker that reconnects while the service is
/// unreachable and polls stream status while it is reachable. State changes
/// are published as [`ObsEvent`]s to subscribers registered with
/// [`subscribe`](Self::subscribe).
///
/// Commands issued while disconnected are dropped silently; callers learn
/// about connectivity through `ConnectionEstablished` / `ConnectionLost`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use obs_connection::{ConnectionManager, EventKind, EventHandler, ObsEvent};
///
/// let manager = ConnectionManager::new(transport);
/// let on_switch: EventHandler = Arc::new(|event: &ObsEvent| println!("{:?}", event));
/// manager.subscribe(EventKind::SceneSwitched, &on_switch);
/// manager.start()?;
///
/// manager.set_scene("Intro");
/// manager.stop();
/// ```
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    config: ManagerConfig,
    state: SharedState,
    bus: EventBus<ObsEvent>,
    worker: Mutex<Option<WorkerHandle>>,
    /// Held for the whole of `start()` and `stop()`, teardown included
    lifecycle: Mutex<()>,
}

impl ConnectionManager {
    /// Create a stopped manager with the default 1 second interval
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, ManagerConfig::default())
    }

    /// Create a stopped manager with a custom configuration
    pub fn with_config(transport: Arc<dyn Transport>, config: ManagerConfig) -> Self {
        Self {
            transport,
            config,
            state: SharedState::default(),
            bus: EventBus::new(),
            worker: Mutex::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    /// Install the push receiver and spawn the background worker
    ///
    /// The worker's first iteration runs immediately, so a reachable service
    /// produces `ConnectionEstablished` without waiting a full interval.
    ///
    /// Waits for a concurrent `stop()` to finish its teardown first. Called
    /// from one of this manager's own subscribers, the worker is by
    /// definition alive and `AlreadyRunning` is returned.
    pub fn start(&self) -> Result<()> {
        if is_worker_thread_for(&self.state) {
            return Err(ConnectionError::AlreadyRunning);
        }

        let _lifecycle = self.lifecycle.lock();
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Err(ConnectionError::AlreadyRunning);
        }

        self.transport.set_push_handler(Some(push_handler(
            Arc::clone(&self.state),
            self.bus.clone(),
        )));

        let context = WorkerContext {
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
            bus: self.bus.clone(),
            poll_interval: self.config.poll_interval,
        };

        match spawn_connection_worker(context) {
            Ok(handle) => {
                *worker = Some(handle);
                tracing::info!("Connection manager started");
                Ok(())
            }
            Err(e) => {
                self.transport.set_push_handler(None);
                Err(e.into())
            }
        }
    }

    /// Stop the worker and disconnect
    ///
    /// Blocks until the current worker iteration finishes. Calling this on a
    /// manager that is not running does nothing. After return no further
    /// events are published until the next `start()`, and a `start()` issued
    /// meanwhile from another thread waits for the teardown to complete.
    ///
    /// Called from one of this manager's subscribers while another thread is
    /// already starting or stopping it, the call returns without effect.
    pub fn stop(&self) {
        let _lifecycle = if is_worker_thread_for(&self.state) {
            // Another thread may hold the lifecycle lock while joining us
            match self.lifecycle.try_lock() {
                Some(guard) => guard,
                None => {
                    tracing::debug!("Manager lifecycle busy, ignoring stop from worker thread");
                    return;
                }
            }
        } else {
            self.lifecycle.lock()
        };

        // The slot lock is released before joining: the worker may be inside
        // a subscriber that calls `is_running()`.
        let handle = self.worker.lock().take();
        let Some(handle) = handle else {
            return;
        };

        if handle.shutdown().is_err() {
            tracing::error!("Connection worker panicked in an event subscriber");
        }

        self.transport.set_push_handler(None);
        self.transport.disconnect();
        self.state.write().was_connected = false;

        tracing::info!("Connection manager stopped");
    }

    /// Whether the background worker is running
    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }

    /// Whether the transport currently holds a live connection
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Last scene fetched on connect or reported by a push event
    pub fn current_scene(&self) -> Option<String> {
        self.state.read().current_scene.clone()
    }

    /// Last stream status observed by a poll
    pub fn stream_status(&self) -> Option<StreamStatus> {
        self.state.read().stream_status.clone()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Ask OBS to switch to `scene_name`
    ///
    /// The local scene is not touched here; it follows the service's
    /// `SceneSwitched` push.
    pub fn set_scene(&self, scene_name: &str) {
        tracing::info!("Setting OBS scene to {}", scene_name);
        self.perform(Request::SetCurrentScene {
            scene_name: scene_name.to_string(),
        });
    }

    pub fn start_streaming(&self) {
        self.perform(Request::StartStreaming);
    }

    pub fn stop_streaming(&self) {
        self.perform(Request::StopStreaming);
    }

    pub fn start_recording(&self) {
        self.perform(Request::StartRecording);
    }

    pub fn stop_recording(&self) {
        self.perform(Request::StopRecording);
    }

    /// Flip streaming based on the last polled status
    ///
    /// Does nothing while disconnected or before the first status poll.
    pub fn toggle_streaming(&self) {
        match self.known_status() {
            Some(status) if status.is_streaming() => self.stop_streaming(),
            Some(_) => self.start_streaming(),
            None => tracing::debug!("No stream status yet, ignoring streaming toggle"),
        }
    }

    /// Flip recording based on the last polled status
    ///
    /// Does nothing while disconnected or before the first status poll.
    pub fn toggle_recording(&self) {
        match self.known_status() {
            Some(status) if status.is_recording() => self.stop_recording(),
            Some(_) => self.start_recording(),
            None => tracing::debug!("No stream status yet, ignoring recording toggle"),
        }
    }

    /// Register `handler` for events of `kind`
    ///
    /// The bus holds the handler weakly; keep the `Arc` alive for as long as
    /// the subscription should last.
    pub fn subscribe(&self, kind: EventKind, handler: &EventHandler) {
        self.bus.subscribe(kind, handler);
    }

    /// Remove one registration of `handler` for `kind`
    pub fn unsubscribe(&self, kind: EventKind, handler: &EventHandler) -> bool {
        self.bus.unsubscribe(kind, handler)
    }

    fn known_status(&self) -> Option<StreamStatus> {
        if !self.transport.is_connected() {
            return None;
        }
        self.stream_status()
    }

    fn perform(&self, request: Request) {
        if !self.transport.is_connected() {
            tracing::debug!(
                "Not connected, dropping {} request",
                request.request_type()
            );
            return;
        }

        if let Err(e) = self.transport.call(&request) {
            tracing::warn!("{} request failed: {}", request.request_type(), e);
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
