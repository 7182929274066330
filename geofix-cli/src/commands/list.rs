//! List command - show saved locations, oldest first.

use std::path::Path;

use console::style;
use geofix::record::{LocationRecord, PersistencePort};

use super::common::open_store;
use crate::error::CliError;

/// Run the list command.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let store = open_store(config_path)?;
    let records = store.list_by_date()?;

    if records.is_empty() {
        println!("No saved locations in {}", store.path().display());
        return Ok(());
    }

    for (index, record) in records.iter().enumerate() {
        let (heading, address) = format_row(index + 1, record);
        println!("{}", style(heading).bold());
        println!("     {}", address);
    }
    Ok(())
}

/// Heading and address line for one record. Rows are numbered from 1, the
/// same numbering `geofix edit` takes.
fn format_row(number: usize, record: &LocationRecord) -> (String, String) {
    let mut heading = format!(
        "{:>3}  {}  {}  [{}]",
        number,
        record.timestamp.format("%Y-%m-%d %H:%M UTC"),
        record.title(),
        record.category
    );
    if let Some(photo) = record.photo_file_name() {
        heading.push_str(&format!("  {}", photo));
    }
    (heading, record.list_address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use geofix::coord::Coordinate;
    use geofix::geocode::Placemark;

    #[test]
    fn test_row_with_placemark() {
        let placemark = Placemark {
            sub_thoroughfare: Some("221B".to_string()),
            thoroughfare: Some("Baker St".to_string()),
            locality: Some("London".to_string()),
            country: Some("United Kingdom".to_string()),
            ..Default::default()
        };
        let record = LocationRecord::new(
            Coordinate::unchecked(51.5238, -0.1586),
            Utc.with_ymd_and_hms(2024, 5, 4, 9, 30, 0).unwrap(),
        )
        .with_placemark(placemark)
        .with_description("Museum")
        .with_category("Historic Building")
        .with_photo_id(2);

        let (heading, address) = format_row(1, &record);
        assert_eq!(
            heading,
            "  1  2024-05-04 09:30 UTC  Museum  [Historic Building]  Photo-2.jpg"
        );
        assert_eq!(address, "221B Baker St, London");
    }

    #[test]
    fn test_row_without_address() {
        let record = LocationRecord::new(
            Coordinate::unchecked(-33.8568, 151.2153),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );

        let (heading, address) = format_row(12, &record);
        assert!(heading.starts_with(" 12  2024-01-01 00:00 UTC  (No Description)"));
        assert_eq!(address, "Lat: -33.85680000, Long: 151.21530000");
    }
}
