//! The transport seam between the SDK and the remote control service
//!
//! Everything protocol-specific (sockets, authentication, framing) lives
//! behind [`Transport`]. The SDK only needs to connect, disconnect, ask
//! whether the link is up, issue requests, and receive native push events.

use std::sync::Arc;

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// A notification pushed by the service without being requested
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PushEvent {
    /// The active scene changed
    SceneSwitched { scene_name: String },
}

/// Callback receiving native push events
///
/// Invoked on whatever thread the transport reads from.
pub type PushHandler = Arc<dyn Fn(PushEvent) + Send + Sync>;

/// Client connection to the remote control service
///
/// Implementations are shared between the connection loop and consumer
/// threads, so every method takes `&self`.
pub trait Transport: Send + Sync {
    /// Establish the connection
    ///
    /// Must return within a bounded time. An unreachable or refusing
    /// service is reported as [`ClientError::ConnectionFailure`](crate::ClientError::ConnectionFailure).
    fn connect(&self) -> Result<()>;

    /// Close the connection; a no-op if already closed
    fn disconnect(&self);

    /// Whether the connection is established right now
    fn is_connected(&self) -> bool;

    /// Send one request and wait for its response
    fn call(&self, request: &Request) -> Result<Response>;

    /// Install (or with `None`, remove) the receiver of native push events
    fn set_push_handler(&self, handler: Option<PushHandler>);
}
