//! Configuration for the heart-rate zone monitor.

use crate::core::history::DEFAULT_HISTORY_CAPACITY;
use crate::core::zones::ZoneBoundaries;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Directory name used under the platform config and data directories.
const APP_DIR: &str = "hr-zone-monitor";

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of samples kept in the history
    pub history_capacity: usize,

    /// Zone boundaries as last entered by the user
    pub zones: ZoneBoundaries,

    /// Print zone occupancy every N decoded samples (0 disables)
    pub report_every: usize,

    /// Delay between frames when replaying a recording
    #[serde(with = "duration_millis")]
    pub frame_interval: Duration,

    /// IANA timezone used for export timestamps
    pub timezone: String,

    /// Path for writing session exports
    pub export_path: PathBuf,

    /// Path for storing session counters
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);

        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            zones: ZoneBoundaries::default(),
            report_every: 30,
            frame_interval: Duration::ZERO,
            timezone: "UTC".to_string(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigFileError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigFileError::IoError(e.to_string()))?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from JSON.
    pub fn from_json(content: &str) -> Result<Self, ConfigFileError> {
        serde_json::from_str(content).map_err(|e| ConfigFileError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigFileError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigFileError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigFileError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Path of the persisted session counters.
    pub fn session_log_path(&self) -> PathBuf {
        self.data_path.join("session.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigFileError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigFileError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigFileError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Timezone for export timestamps, falling back to UTC.
    pub fn export_timezone(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            Tz::UTC
        })
    }
}

/// Configuration file errors.
#[derive(Debug)]
pub enum ConfigFileError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigFileError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigFileError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigFileError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {}

/// Serde support for Duration as milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
