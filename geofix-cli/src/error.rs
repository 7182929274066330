//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use geofix::config::ConfigFileError;
use geofix::geocode::GeocodeError;
use geofix::location::ProviderError;
use geofix::record::StoreError;
use geofix::session::DriverError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration file could not be loaded
    Config(ConfigFileError),
    /// Invalid command-line input
    InvalidArgument(String),
    /// Replay track could not be read
    Replay { path: PathBuf, error: ProviderError },
    /// Failed to create the reverse geocoder
    Geocoder(GeocodeError),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Failed to install the Ctrl-C handler
    Signal(String),
    /// The session driver stopped unexpectedly
    Session(DriverError),
    /// Record store error
    Store(StoreError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        // Print additional help for specific errors
        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!(
                    "Check {} or pass another file with --config.",
                    geofix::config::config_file_path().display()
                );
            }
            CliError::Replay { .. } => {
                eprintln!();
                eprintln!("Replay tracks are JSON lines, one step per line:");
                eprintln!(r#"  {{"t": 0.5, "lat": 47.37, "lon": 8.54, "accuracy": 65}}"#);
                eprintln!(r#"  {{"t": 2.0, "error": "location_unknown"}}"#);
            }
            CliError::Geocoder(_) => {
                eprintln!();
                eprintln!("Use --offline to skip reverse geocoding.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Replay { path, error } => {
                write!(f, "Failed to load replay '{}': {}", path.display(), error)
            }
            CliError::Geocoder(e) => write!(f, "Failed to create geocoder: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to install Ctrl-C handler: {}", msg),
            CliError::Session(e) => write!(f, "Session error: {}", e),
            CliError::Store(e) => write!(f, "Record store error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Replay { error, .. } => Some(error),
            CliError::Geocoder(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Session(e) => Some(e),
            CliError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<DriverError> for CliError {
    fn from(e: DriverError) -> Self {
        CliError::Session(e)
    }
}
