//! Private transport boundary for OBS remote control
//!
//! This crate defines the vocabulary the SDK uses to talk to the remote
//! control service: the requests it sends, the responses and stream status
//! snapshots it gets back, the native push events it receives, and the
//! [`Transport`] trait a concrete socket client implements.
//!
//! The wire protocol itself (socket handling, authentication, message
//! framing) is left to `Transport` implementations.

mod error;
mod request;
mod response;
mod status;
mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use error::{ClientError, Result};
pub use request::Request;
pub use response::Response;
pub use status::StreamStatus;
pub use transport::{PushEvent, PushHandler, Transport};

#[cfg(any(test, feature = "test-support"))]
pub use mock::MockTransport;
