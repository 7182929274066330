//! Record data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::geocode::Placemark;

/// Category used when none was picked.
pub const NO_CATEGORY: &str = "No Category";

/// Built-in categories, in display order.
pub const CATEGORIES: &[&str] = &[
    NO_CATEGORY,
    "Apple Store",
    "Bar",
    "Bookstore",
    "Club",
    "Grocery Store",
    "Historic Building",
    "House",
    "Icecream Vendor",
    "Landmark",
    "Park",
];

/// Returns true if `name` is one of the built-in categories.
pub fn is_known_category(name: &str) -> bool {
    CATEGORIES.contains(&name)
}

/// A tagged, saved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub coordinate: Coordinate,
    /// Address as shown when the record was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placemark: Option<Placemark>,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_id: Option<u64>,
}

impl LocationRecord {
    pub fn new(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            address: None,
            placemark: None,
            description: String::new(),
            category: NO_CATEGORY.to_string(),
            timestamp,
            photo_id: None,
        }
    }

    /// Attach a placemark, keeping its single-line rendering as the address.
    pub fn with_placemark(mut self, placemark: Placemark) -> Self {
        self.address = Some(placemark.single_line());
        self.placemark = Some(placemark);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_photo_id(mut self, photo_id: u64) -> Self {
        self.photo_id = Some(photo_id);
        self
    }

    /// Title for lists and map pins.
    pub fn title(&self) -> &str {
        if self.description.trim().is_empty() {
            "(No Description)"
        } else {
            &self.description
        }
    }

    /// Address for list rows: street and city, falling back to the stored
    /// address and then to the raw coordinate.
    pub fn list_address(&self) -> String {
        let short = self
            .placemark
            .as_ref()
            .map(Placemark::short)
            .filter(|s| !s.is_empty());
        if let Some(short) = short {
            return short;
        }

        let stored = self
            .address
            .as_deref()
            .and_then(|a| a.lines().next())
            .map(str::trim)
            .filter(|a| !a.is_empty());
        match stored {
            Some(address) => address.to_string(),
            None => format!(
                "Lat: {:.8}, Long: {:.8}",
                self.coordinate.latitude, self.coordinate.longitude
            ),
        }
    }

    pub fn has_photo(&self) -> bool {
        self.photo_id.is_some()
    }

    /// File name the photo is stored under, if there is one.
    pub fn photo_file_name(&self) -> Option<String> {
        self.photo_id.map(|id| format!("Photo-{}.jpg", id))
    }
}
