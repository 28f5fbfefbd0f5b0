//! # OBS Connection
//!
//! Connection lifecycle for the OBS remote-control SDK: one background thread
//! keeps the connection alive, polls stream status, and publishes state
//! changes on an event bus.
//!
//! ## Key Features
//!
//! - **Sync-First API**: No async/await; the worker is a plain thread
//! - **Automatic Reconnection**: Unreachable service is retried every interval, silently
//! - **Change Detection**: `StreamStatusChanged` fires only when the polled payload differs
//! - **Push Passthrough**: Scene switches pushed by OBS update local state and are republished
//! - **Graceful Degradation**: Commands issued while disconnected are dropped, not errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use obs_connection::{ConnectionManager, EventHandler, EventKind, ObsEvent};
//!
//! let manager = ConnectionManager::new(transport);
//!
//! let on_status: EventHandler = Arc::new(|event: &ObsEvent| {
//!     if let ObsEvent::StreamStatusChanged(status) = event {
//!         println!("recording: {}", status.is_recording());
//!     }
//! });
//! manager.subscribe(EventKind::StreamStatusChanged, &on_status);
//!
//! manager.start()?;
//! manager.toggle_recording();
//! manager.stop();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ConnectionManager
//!     │
//!     ├── Transport (connect / call / push)
//!     │       └── push handler ──► SceneSwitched
//!     │
//!     ├── worker thread "obs-connection"
//!     │       ├── connected:    GetStreamingStatus ──► StreamStatusChanged
//!     │       └── disconnected: ConnectionLost, connect, GetCurrentScene ──► ConnectionEstablished
//!     │
//!     └── EventBus<ObsEvent> ──► subscribers
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod manager;
mod worker;

// Re-export main types for convenience
pub use config::ManagerConfig;
pub use error::{ConnectionError, Result};
pub use event::{EventHandler, EventKind, ObsEvent};
pub use manager::ConnectionManager;

// Re-export commonly used types from dependencies
pub use obs_client::{StreamStatus, Transport};
