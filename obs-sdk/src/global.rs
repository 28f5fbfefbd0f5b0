//! Process-wide shared connection
//!
//! Applications install one [`SharedConnection`] at startup; consumers that
//! cannot be handed a reference look it up with [`shared`].

use std::sync::OnceLock;

use crate::error::{Result, SdkError};
use crate::shared::SharedConnection;

static SHARED: OnceLock<SharedConnection> = OnceLock::new();

/// Install the process-wide shared connection
///
/// Only the first call succeeds; later calls return
/// [`SdkError::AlreadyInstalled`] and drop their argument.
pub fn install(connection: SharedConnection) -> Result<&'static SharedConnection> {
    SHARED
        .set(connection)
        .map_err(|_| SdkError::AlreadyInstalled)?;
    SHARED.get().ok_or(SdkError::AlreadyInstalled)
}

/// The installed shared connection, if any
pub fn shared() -> Option<&'static SharedConnection> {
    SHARED.get()
}
