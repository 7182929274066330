//! Tag command - commit a location record to the store.

use std::path::Path;

use chrono::Utc;
use geofix::coord::Coordinate;
use geofix::record::{JsonLinesStore, LocationRecord, PersistencePort, NO_CATEGORY};
use tracing::info;

use super::common::validate_category;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tag command.
pub struct TagArgs {
    pub lat: f64,
    pub lon: f64,
    pub address: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub with_photo: bool,
}

/// Run the tag command.
pub fn run(args: TagArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("tag");

    let store = JsonLinesStore::new(&runner.config().store.path);
    let record = build_record(args, &store)?;
    store.save(&record)?;

    info!(
        path = %store.path().display(),
        title = record.title(),
        "Location tagged"
    );
    println!("Tagged:    {}", record.title());
    println!("Location:  {}", record.coordinate);
    println!("Category:  {}", record.category);
    if let Some(address) = &record.address {
        println!("Address:   {}", address);
    }
    if let Some(photo) = record.photo_file_name() {
        println!("Photo:     {}", photo);
    }
    println!("Saved to:  {}", store.path().display());
    Ok(())
}

fn build_record(args: TagArgs, store: &dyn PersistencePort) -> Result<LocationRecord, CliError> {
    let coordinate = Coordinate::new(args.lat, args.lon)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let category = args.category.unwrap_or_else(|| NO_CATEGORY.to_string());
    validate_category(&category)?;

    let mut record = LocationRecord::new(coordinate, Utc::now()).with_category(category);
    if let Some(address) = args.address {
        record = record.with_address(address);
    }
    if let Some(description) = args.description {
        record = record.with_description(description);
    }
    if args.with_photo {
        record = record.with_photo_id(store.next_photo_id()?);
    }
    Ok(record)
}
