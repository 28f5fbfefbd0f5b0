use thiserror::Error;

use crate::logging::LoggingError;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("A shared OBS connection is already installed")]
    AlreadyInstalled,
}

pub type Result<T> = std::result::Result<T, SdkError>;
