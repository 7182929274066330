//! Common helpers shared across CLI commands.

use std::path::Path;

use geofix::record::{is_known_category, JsonLinesStore, CATEGORIES};

use crate::error::CliError;
use crate::runner::load_config;

/// Reject names outside the built-in category list.
pub fn validate_category(category: &str) -> Result<(), CliError> {
    if is_known_category(category) {
        return Ok(());
    }
    Err(CliError::InvalidArgument(format!(
        "Unknown category '{}'. Choose one of: {}",
        category,
        CATEGORIES.join(", ")
    )))
}

/// Open the record store named in the config file.
pub fn open_store(config_path: Option<&Path>) -> Result<JsonLinesStore, CliError> {
    let config = load_config(config_path)?;
    Ok(JsonLinesStore::new(&config.store.path))
}
