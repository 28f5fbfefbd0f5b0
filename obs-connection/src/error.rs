use thiserror::Error;

/// Errors that can occur when starting the connection manager
///
/// Connection failures to the remote service are not errors at this level:
/// the worker retries them and reports them through `ConnectionLost` /
/// `ConnectionEstablished` events.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// `start()` called while the worker is already running
    #[error("Connection worker is already running")]
    AlreadyRunning,

    /// The worker thread could not be spawned
    #[error("Failed to spawn connection worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result type for Connection Manager operations
pub type Result<T> = std::result::Result<T, ConnectionError>;
