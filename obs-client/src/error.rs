//! Error types for the transport boundary

use thiserror::Error;

/// Errors that can occur while talking to the remote control service
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service could not be reached or refused the connection
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// A request was issued without an established connection
    #[error("Not connected")]
    NotConnected,

    /// The service answered a request with an error status
    #[error("Request {request} failed: {message}")]
    RequestFailed {
        request: &'static str,
        message: String,
    },

    /// The service answered with a payload that could not be interpreted
    #[error("Malformed response: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether this is the expected, transient "could not connect" kind
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, ClientError::ConnectionFailure(_))
    }
}

/// Type alias for results that can return a ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
