//! Settings structs, one per `[section]`.

use std::path::PathBuf;
use std::time::Duration;

use super::file::config_directory;
use crate::fix::{DEFAULT_DESIRED_ACCURACY_M, DEFAULT_STALL_DISTANCE_M};
use crate::geocode::{NominatimConfig, DEFAULT_NOMINATIM_URL};
use crate::session::SessionConfig;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub session: SessionSettings,
    pub geocoder: GeocoderSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
}

/// `[session]` thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Meters.
    pub desired_accuracy: f64,
    /// Seconds.
    pub max_sample_age: u64,
    /// Meters.
    pub stall_distance: f64,
    /// Seconds.
    pub stall_interval: u64,
    /// Seconds.
    pub timeout: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            desired_accuracy: DEFAULT_DESIRED_ACCURACY_M,
            max_sample_age: 5,
            stall_distance: DEFAULT_STALL_DISTANCE_M,
            stall_interval: 10,
            timeout: 60,
        }
    }
}

impl SessionSettings {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_desired_accuracy(self.desired_accuracy)
            .with_max_sample_age(Duration::from_secs(self.max_sample_age))
            .with_stall_distance(self.stall_distance)
            .with_stall_interval(Duration::from_secs(self.stall_interval))
            .with_timeout(Duration::from_secs(self.timeout))
    }
}

/// `[geocoder]` connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderSettings {
    pub url: String,
    /// Seconds.
    pub timeout: u64,
    pub user_agent: String,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        let defaults = NominatimConfig::default();
        Self {
            url: DEFAULT_NOMINATIM_URL.to_string(),
            timeout: defaults.timeout.as_secs(),
            user_agent: defaults.user_agent,
        }
    }
}

impl GeocoderSettings {
    pub fn to_nominatim_config(&self) -> NominatimConfig {
        NominatimConfig {
            url: self.url.clone(),
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// `[logging]` output location.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: crate::logging::default_log_dir(),
            file: crate::logging::default_log_file().to_string(),
        }
    }
}

/// `[store]` location of saved records.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: config_directory().join("locations.jsonl"),
        }
    }
}
