//! CLI runner for common setup.
//!
//! Loads the config file and initializes logging for commands that need
//! both.

use std::path::Path;

use geofix::config::ConfigFile;
use geofix::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Console log level. Reports go to stdout; stderr only shows problems.
const CONSOLE_LOG_LEVEL: &str = "warn";

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// `config_path` overrides the default `~/.geofix/config.ini`.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let logging_guard = init_logging(
            &config.logging.directory,
            &config.logging.file,
            CONSOLE_LOG_LEVEL,
        )
        .map_err(CliError::LoggingInit)?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("GeoFix v{}", geofix::VERSION);
        info!("GeoFix CLI: {} command", command);
    }
}

/// Load the config file without touching logging.
pub fn load_config(config_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match config_path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.ini");
        fs::write(&path, "[session]\ntimeout = 15\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.session.timeout, 15);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.ini");
        fs::write(&path, "[geocoder]\nurl = not-a-url\n").unwrap();

        assert!(matches!(load_config(Some(path.as_path())), Err(CliError::Config(_))));
    }
}
