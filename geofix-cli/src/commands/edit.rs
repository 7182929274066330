//! Edit command - update a saved location.
//!
//! Only the description and category change; the coordinate, address and
//! date stay as tagged. The photo id can be dropped.

use std::path::Path;

use geofix::record::{JsonLinesStore, LocationRecord, PersistencePort};
use tracing::info;

use super::common::validate_category;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the edit command.
pub struct EditArgs {
    /// Row number as printed by `geofix list`.
    pub row: usize,
    pub description: Option<String>,
    pub category: Option<String>,
    pub remove_photo: bool,
}

/// Run the edit command.
pub fn run(args: EditArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("edit");

    let store = JsonLinesStore::new(&runner.config().store.path);
    let records = store.list_by_date()?;
    let existing = select_row(&records, args.row)?;
    let updated = apply_edit(existing, args)?;
    store.replace(existing, &updated)?;

    info!(title = updated.title(), "Location updated");
    println!("Updated:   {}", updated.title());
    println!("Category:  {}", updated.category);
    match updated.photo_file_name() {
        Some(photo) => println!("Photo:     {}", photo),
        None => println!("Photo:     none"),
    }
    Ok(())
}

fn select_row(records: &[LocationRecord], row: usize) -> Result<&LocationRecord, CliError> {
    row.checked_sub(1)
        .and_then(|index| records.get(index))
        .ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "No saved location #{} ({} saved). Run `geofix list` to see row numbers.",
                row,
                records.len()
            ))
        })
}

fn apply_edit(existing: &LocationRecord, args: EditArgs) -> Result<LocationRecord, CliError> {
    let mut updated = existing.clone();
    if let Some(description) = args.description {
        updated.description = description;
    }
    if let Some(category) = args.category {
        validate_category(&category)?;
        updated.category = category;
    }
    if args.remove_photo {
        updated.photo_id = None;
    }
    Ok(updated)
}
