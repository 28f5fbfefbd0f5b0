//! Connection settings
//!
//! Settings live in a small JSON file, `~/.devdeck/obs.json` by default:
//!
//! ```json
//! {
//!   "host": "localhost",
//!   "port": 4444,
//!   "password": ""
//! }
//! ```
//!
//! Missing keys take their default. A missing file is created with the
//! defaults so there is something to edit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 4444;

/// Errors produced while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings are present but malformed or semantically invalid
    #[error("Invalid OBS settings: {0}")]
    Validation(String),

    #[error("Failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where and how to reach OBS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: String::new(),
        }
    }
}

impl Settings {
    /// Check the values a transport cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.host.trim().is_empty() {
            return Err(SettingsError::Validation("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(SettingsError::Validation("port must not be 0".to_string()));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(contents: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(contents)
            .map_err(|e| SettingsError::Validation(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Anything that can produce [`Settings`]
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> Result<Settings, SettingsError>;
}

/// Default settings file location: `~/.devdeck/obs.json`
///
/// Falls back to a path relative to the working directory when no home
/// directory can be determined.
pub fn default_settings_path() -> PathBuf {
    let relative = Path::new(".devdeck").join("obs.json");
    match dirs::home_dir() {
        Some(home) => home.join(relative),
        None => relative,
    }
}

/// Settings backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_defaults(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents)
    }
}

impl Default for FileSettings {
    fn default() -> Self {
        Self::new(default_settings_path())
    }
}

impl SettingsSource for FileSettings {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            tracing::warn!(
                "No settings file found, creating {} with defaults",
                self.path.display()
            );
            let settings = Settings::default();
            if let Err(e) = self.write_defaults(&settings) {
                tracing::warn!(
                    "Could not write default settings to {}: {}",
                    self.path.display(),
                    e
                );
            }
            return Ok(settings);
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;
        Settings::from_json(&contents)
    }
}

/// Fixed in-memory settings
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsSource for StaticSettings {
    fn load(&self) -> Result<Settings, SettingsError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

/// Load settings, logging any failure and falling back to defaults
pub fn load_or_default(source: &dyn SettingsSource) -> Settings {
    match source.load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("{}; falling back to default settings", e);
            Settings::default()
        }
    }
}
