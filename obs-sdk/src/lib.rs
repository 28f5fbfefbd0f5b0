//! # OBS SDK
//!
//! A sync-first remote control SDK for OBS. Any number of consumers (deck
//! buttons, panels, scripts) share one connection that is opened when the
//! first of them attaches and closed when the last one detaches.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use obs_sdk::{EventHandler, EventKind, FileSettings, ObsEvent, SharedConnection};
//!
//! let shared = SharedConnection::new(FileSettings::default(), |settings| {
//!     my_transport(settings)
//! });
//!
//! // First lease starts the connection manager
//! let lease = shared.acquire();
//!
//! let on_status: EventHandler = Arc::new(|event: &ObsEvent| {
//!     if let ObsEvent::StreamStatusChanged(status) = event {
//!         println!("streaming: {}", status.is_streaming());
//!     }
//! });
//! lease.subscribe(EventKind::StreamStatusChanged, &on_status);
//!
//! lease.set_scene("Intro");
//! lease.toggle_recording();
//!
//! // Last release stops the manager and closes the connection
//! lease.release();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! obs-sdk (SharedConnection, ConnectionLease, settings, logging)
//!     ↓
//! obs-connection (ConnectionManager, reconnect/poll worker)
//!     ↓                      ↓
//! obs-client (Transport)   event-bus (EventBus)
//! ```

pub mod global;
pub mod logging;
pub mod settings;

mod error;
mod shared;

pub use error::{Result, SdkError};
pub use settings::{
    default_settings_path, load_or_default, FileSettings, Settings, SettingsError,
    SettingsSource, StaticSettings,
};
pub use shared::{ConnectionLease, LifecycleStats, SharedConnection, TransportFactory};

// Re-export the types consumers need to subscribe and implement transports
pub use event_bus::Event;
pub use obs_client::{ClientError, PushEvent, PushHandler, Request, Response, StreamStatus, Transport};
pub use obs_connection::{EventHandler, EventKind, ManagerConfig, ObsEvent};

#[cfg(feature = "test-support")]
pub use obs_client::MockTransport;
