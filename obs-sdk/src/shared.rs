//! Reference-counted shared connection
//!
//! Many independent consumers share one [`ConnectionManager`]. The manager is
//! built and started when the first consumer acquires a lease, and stopped
//! when the last lease is released. All consumer operations live on
//! [`ConnectionLease`], so there is no way to use the connection without
//! holding a reference, and no way to release one twice.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use obs_client::{StreamStatus, Transport};
use obs_connection::{ConnectionManager, EventHandler, EventKind, ManagerConfig};
use parking_lot::Mutex;

use crate::settings::{load_or_default, Settings, SettingsSource};

/// Builds a transport for the loaded settings
pub type TransportFactory = Box<dyn Fn(&Settings) -> Arc<dyn Transport> + Send + Sync>;

/// Manager start/stop counters since the shared connection was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleStats {
    pub started: usize,
    pub stopped: usize,
}

/// `manager` is `Some` exactly when `ref_count > 0`
struct Inner {
    ref_count: usize,
    manager: Option<Arc<ConnectionManager>>,
}

/// One connection to OBS shared by every consumer holding a lease
pub struct SharedConnection {
    settings: Box<dyn SettingsSource>,
    transport_factory: TransportFactory,
    manager_config: ManagerConfig,
    inner: Mutex<Inner>,
    started: AtomicUsize,
    stopped: AtomicUsize,
}

impl SharedConnection {
    pub fn new<S, F>(settings: S, transport_factory: F) -> Self
    where
        S: SettingsSource + 'static,
        F: Fn(&Settings) -> Arc<dyn Transport> + Send + Sync + 'static,
    {
        Self {
            settings: Box::new(settings),
            transport_factory: Box::new(transport_factory),
            manager_config: ManagerConfig::default(),
            inner: Mutex::new(Inner {
                ref_count: 0,
                manager: None,
            }),
            started: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
        }
    }

    /// Use a custom configuration for managers built from now on
    pub fn with_manager_config(mut self, config: ManagerConfig) -> Self {
        self.manager_config = config;
        self
    }

    /// Take a reference to the shared connection
    ///
    /// The first lease loads settings (falling back to defaults), builds the
    /// transport, and starts the manager. Never fails: a manager that cannot
    /// start is logged and the lease is still issued, with every command
    /// silently dropped.
    ///
    /// # Deadlocks
    ///
    /// Releasing the last lease stops the manager while this connection's
    /// lock is held, and stopping waits for the worker thread. An event
    /// subscriber of this connection must therefore not call `acquire`, or
    /// clone a lease, while another thread may be dropping the last lease.
    /// Dropping a lease inside a subscriber is fine, the last one included.
    pub fn acquire(&self) -> ConnectionLease<'_> {
        let mut inner = self.inner.lock();

        let manager = match &inner.manager {
            Some(manager) => Arc::clone(manager),
            None => {
                let manager = Arc::new(self.build_manager());
                inner.manager = Some(Arc::clone(&manager));
                manager
            }
        };
        inner.ref_count += 1;
        tracing::debug!("OBS connection acquired (refs: {})", inner.ref_count);

        ConnectionLease {
            shared: self,
            manager,
        }
    }

    /// Number of live leases
    pub fn ref_count(&self) -> usize {
        self.inner.lock().ref_count
    }

    /// Whether a manager currently exists
    pub fn is_active(&self) -> bool {
        self.inner.lock().manager.is_some()
    }

    pub fn lifecycle_stats(&self) -> LifecycleStats {
        LifecycleStats {
            started: self.started.load(Ordering::SeqCst),
            stopped: self.stopped.load(Ordering::SeqCst),
        }
    }

    fn build_manager(&self) -> ConnectionManager {
        let settings = load_or_default(self.settings.as_ref());
        tracing::info!("Connecting to OBS at {}:{}", settings.host, settings.port);

        let transport = (self.transport_factory)(&settings);
        let manager = ConnectionManager::with_config(transport, self.manager_config.clone());
        if let Err(e) = manager.start() {
            tracing::error!("Failed to start OBS connection manager: {}", e);
        }

        self.started.fetch_add(1, Ordering::SeqCst);
        manager
    }

    fn release(&self) {
        let mut inner = self.inner.lock();
        debug_assert!(inner.ref_count > 0, "release without a matching acquire");
        inner.ref_count = inner.ref_count.saturating_sub(1);
        tracing::debug!("OBS connection released (refs: {})", inner.ref_count);

        if inner.ref_count > 0 {
            return;
        }

        // Stop under the lock so a concurrent acquire waits for the old
        // manager to be fully gone before building a new one.
        if let Some(manager) = inner.manager.take() {
            manager.stop();
            self.stopped.fetch_add(1, Ordering::SeqCst);
            tracing::info!("Last OBS consumer released, connection closed");
        }
    }
}

impl fmt::Debug for SharedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SharedConnection")
            .field("ref_count", &inner.ref_count)
            .field("active", &inner.manager.is_some())
            .field("manager_config", &self.manager_config)
            .finish()
    }
}

/// A consumer's reference to the shared connection
///
/// Dropping the lease releases it. Cloning acquires another reference.
///
/// Cloning from an event subscriber can deadlock against a concurrent final
/// release; see [`SharedConnection::acquire`].
pub struct ConnectionLease<'a> {
    shared: &'a SharedConnection,
    manager: Arc<ConnectionManager>,
}

impl ConnectionLease<'_> {
    /// Give the reference back; same as dropping the lease
    pub fn release(self) {
        drop(self);
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn current_scene(&self) -> Option<String> {
        self.manager.current_scene()
    }

    pub fn stream_status(&self) -> Option<StreamStatus> {
        self.manager.stream_status()
    }

    pub fn set_scene(&self, scene_name: &str) {
        self.manager.set_scene(scene_name);
    }

    pub fn start_streaming(&self) {
        self.manager.start_streaming();
    }

    pub fn stop_streaming(&self) {
        self.manager.stop_streaming();
    }

    pub fn start_recording(&self) {
        self.manager.start_recording();
    }

    pub fn stop_recording(&self) {
        self.manager.stop_recording();
    }

    pub fn toggle_streaming(&self) {
        self.manager.toggle_streaming();
    }

    pub fn toggle_recording(&self) {
        self.manager.toggle_recording();
    }

    /// Subscribe to manager events; see [`ConnectionManager::subscribe`]
    pub fn subscribe(&self, kind: EventKind, handler: &EventHandler) {
        self.manager.subscribe(kind, handler);
    }

    pub fn unsubscribe(&self, kind: EventKind, handler: &EventHandler) -> bool {
        self.manager.unsubscribe(kind, handler)
    }
}

impl Clone for ConnectionLease<'_> {
    fn clone(&self) -> Self {
        self.shared.acquire()
    }
}

impl Drop for ConnectionLease<'_> {
    fn drop(&mut self) {
        self.shared.release();
    }
}

impl fmt::Debug for ConnectionLease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLease")
            .field("connected", &self.manager.is_connected())
            .finish()
    }
}
