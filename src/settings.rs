//! Settings schema and loading.
//!
//! Settings live in `settings.toml` under the user's config directory. Every
//! section uses `#[serde(default)]`, so a partial file only overrides what
//! it names and a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::device::camera::Facing;
use crate::device::location::PositionOptions;
use crate::state::data::GeoLocation;
use crate::state::store::{KvStore, DEFAULT_KEY};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root settings structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the collection is persisted
    pub storage: StorageSettings,

    /// Camera frame source and capture encoding
    pub camera: CameraSettings,

    /// Position lookup per capture
    pub location: LocationSettings,

    /// Log filter used when `RUST_LOG` is unset
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database file
    pub path: PathBuf,

    /// Key holding the collection document
    pub key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: KvStore::default_path(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Image file refreshed by an external capture tool (e.g. a webcam
    /// snapshot daemon). Without it the camera reports no device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// `environment` (rear) or `user` (front)
    pub facing: Facing,

    /// Preferred frame width
    pub width: u32,

    /// Preferred frame height
    pub height: u32,

    /// JPEG quality for captured frames (1-100)
    pub jpeg_quality: u8,

    /// Live preview refresh period
    pub preview_interval_ms: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            facing: Facing::Environment,
            width: 1920,
            height: 1080,
            jpeg_quality: 90,
            preview_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    /// Fixed position reported for every capture (stationary workstations).
    /// Without it geolocation is unsupported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<GeoLocation>,

    pub timeout_secs: u64,

    pub high_accuracy: bool,

    /// Oldest cached reading accepted; 0 forces a fresh fix
    pub maximum_age_secs: u64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            fixed: None,
            timeout_secs: 10,
            high_accuracy: true,
            maximum_age_secs: 0,
        }
    }
}

impl LocationSettings {
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_secs(self.timeout_secs),
            maximum_age: Duration::from_secs(self.maximum_age_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "artifact_scanner=info".to_string(),
        }
    }
}

/// Get the path to the settings file.
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artifact-scanner")
        .join("settings.toml")
}

impl Settings {
    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&contents)?;
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults on any error.
    ///
    /// Runs before logging is initialized, so the error is handed back for
    /// the caller to report.
    pub fn load_or_default() -> (Self, Option<SettingsError>) {
        match Self::load_from_path(&settings_path()) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}
