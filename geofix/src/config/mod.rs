//! Configuration file handling.
//!
//! Settings live in an INI file, by default `~/.geofix/config.ini`:
//!
//! ```ini
//! [session]
//! desired_accuracy = 10
//! max_sample_age = 5
//! stall_distance = 1
//! stall_interval = 10
//! timeout = 60
//!
//! [geocoder]
//! url = https://nominatim.openstreetmap.org/reverse
//! timeout = 10
//! user_agent = geofix/0.1.0
//!
//! [logging]
//! directory = ~/.geofix/logs
//! file = geofix.log
//!
//! [store]
//! path = ~/.geofix/locations.jsonl
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, expand_tilde, ConfigFileError};
pub use settings::{ConfigFile, GeocoderSettings, LoggingSettings, SessionSettings, StoreSettings};
