//! Background worker thread for connection upkeep
//!
//! The worker is the only place that connects, polls, and decides when a
//! connection was lost. One iteration runs per poll interval:
//!
//! - connected: poll stream status, publish `StreamStatusChanged` on change
//! - disconnected: publish `ConnectionLost` on the connected→disconnected
//!   edge, then try to connect; on success fetch the scene and publish
//!   `ConnectionEstablished`
//!
//! The inter-iteration sleep is a `recv_timeout` on the shutdown channel, so
//! a stop request cuts the sleep short.

use std::cell::Cell;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use event_bus::EventBus;
use obs_client::{ClientError, PushEvent, PushHandler, Request, StreamStatus, Transport};
use parking_lot::RwLock;

use crate::event::ObsEvent;

/// Locally mirrored service state
///
/// Written by the worker and by the push handler, read by any consumer.
#[derive(Debug, Default)]
pub(crate) struct ConnectionState {
    /// Edge detector for connection loss
    pub was_connected: bool,
    pub current_scene: Option<String>,
    pub stream_status: Option<StreamStatus>,
}

pub(crate) type SharedState = Arc<RwLock<ConnectionState>>;

thread_local! {
    /// Address of the state owned by the worker running on this thread, 0 elsewhere
    static WORKER_STATE: Cell<usize> = const { Cell::new(0) };
}

fn state_id(state: &SharedState) -> usize {
    Arc::as_ptr(state) as usize
}

/// Whether the caller is running on the worker thread that owns `state`
pub(crate) fn is_worker_thread_for(state: &SharedState) -> bool {
    WORKER_STATE.with(|current| current.get() == state_id(state))
}

/// Everything one worker iteration needs
pub(crate) struct WorkerContext {
    pub transport: Arc<dyn Transport>,
    pub state: SharedState,
    pub bus: EventBus<ObsEvent>,
    pub poll_interval: Duration,
}

/// Handle to a running worker thread
pub(crate) struct WorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal the worker and wait for it to exit
    ///
    /// Returns `Err` if the worker died from a panicking subscriber. When
    /// called from the worker thread itself (a subscriber stopping the
    /// manager), the thread is signalled but not joined; it exits as soon as
    /// the current handler returns.
    pub fn shutdown(self) -> thread::Result<()> {
        let _ = self.shutdown_tx.send(());

        if self.thread.thread().id() == thread::current().id() {
            tracing::warn!("Connection worker stopped from its own thread, not joining");
            return Ok(());
        }

        self.thread.join()
    }
}

/// Spawns the background connection worker thread
pub(crate) fn spawn_connection_worker(context: WorkerContext) -> std::io::Result<WorkerHandle> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let thread = thread::Builder::new()
        .name("obs-connection".to_string())
        .spawn(move || run_connection_loop(context, shutdown_rx))?;

    Ok(WorkerHandle {
        shutdown_tx,
        thread,
    })
}

/// Main loop running on the worker thread
fn run_connection_loop(context: WorkerContext, shutdown_rx: mpsc::Receiver<()>) {
    WORKER_STATE.with(|current| current.set(state_id(&context.state)));
    tracing::info!(
        "Connection worker started (interval: {:?})",
        context.poll_interval
    );

    loop {
        context.tick();

        match shutdown_rx.recv_timeout(context.poll_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("Connection worker shut down");
}

impl WorkerContext {
    /// Run a single worker iteration
    pub fn tick(&self) {
        if self.transport.is_connected() {
            self.poll_stream_status();
        } else {
            self.reconnect();
        }
    }

    fn poll_stream_status(&self) {
        let status = match self.transport.call(&Request::GetStreamingStatus) {
            Ok(response) => response.into_stream_status(),
            Err(e) => {
                tracing::warn!("Stream status poll failed: {}", e);
                return;
            }
        };

        let changed = {
            let mut state = self.state.write();
            if state.stream_status.as_ref() != Some(&status) {
                state.stream_status = Some(status.clone());
                true
            } else {
                false
            }
        };

        if changed {
            tracing::info!("Stream status changed");
            self.bus.publish(&ObsEvent::StreamStatusChanged(status));
        }
    }

    fn reconnect(&self) {
        let lost = std::mem::replace(&mut self.state.write().was_connected, false);
        if lost {
            tracing::info!("Connection to OBS lost, trying to reconnect");
            self.bus.publish(&ObsEvent::ConnectionLost);
        }

        if let Err(e) = self.transport.connect() {
            if e.is_connection_failure() {
                tracing::trace!("Connect attempt failed: {}", e);
            } else {
                tracing::warn!("Connect attempt failed unexpectedly, will retry: {}", e);
            }
            return;
        }

        let scene = match self.fetch_current_scene() {
            Ok(scene) => scene,
            Err(e) => {
                tracing::warn!("Connected but could not fetch current scene, will retry: {}", e);
                self.transport.disconnect();
                return;
            }
        };

        {
            let mut state = self.state.write();
            state.was_connected = true;
            state.current_scene = Some(scene);
        }

        tracing::info!("Connection to OBS established");
        self.bus.publish(&ObsEvent::ConnectionEstablished);
    }

    fn fetch_current_scene(&self) -> Result<String, ClientError> {
        self.transport.call(&Request::GetCurrentScene)?.scene_name()
    }
}

/// Build the receiver for the transport's native push events
///
/// Scene switches update the mirrored scene before being republished, so
/// subscribers reading `current_scene()` see the new value.
pub(crate) fn push_handler(state: SharedState, bus: EventBus<ObsEvent>) -> PushHandler {
    Arc::new(move |event: PushEvent| match event {
        PushEvent::SceneSwitched { scene_name } => {
            state.write().current_scene = Some(scene_name.clone());
            tracing::info!("OBS scene switched to {}", scene_name);
            bus.publish(&ObsEvent::SceneSwitched { scene_name });
        }
        #[allow(unreachable_patterns)]
        other => tracing::trace!("Ignoring push event {:?}", other),
    })
}
