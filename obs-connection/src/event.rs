//! Events published by the connection manager

use event_bus::{Event, Handler};
use obs_client::StreamStatus;

/// Tag identifying an [`ObsEvent`] variant, used to subscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConnectionEstablished,
    ConnectionLost,
    StreamStatusChanged,
    SceneSwitched,
}

/// State-change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ObsEvent {
    /// The connection came up and the current scene has been fetched
    ConnectionEstablished,

    /// A previously established connection went away
    ConnectionLost,

    /// A poll observed a status different from the last one (or the first one)
    StreamStatusChanged(StreamStatus),

    /// The service pushed a scene switch; passed through unmodified
    SceneSwitched { scene_name: String },
}

impl Event for ObsEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            ObsEvent::ConnectionEstablished => EventKind::ConnectionEstablished,
            ObsEvent::ConnectionLost => EventKind::ConnectionLost,
            ObsEvent::StreamStatusChanged(_) => EventKind::StreamStatusChanged,
            ObsEvent::SceneSwitched { .. } => EventKind::SceneSwitched,
        }
    }
}

/// Subscriber callback for manager events
pub type EventHandler = Handler<ObsEvent>;
