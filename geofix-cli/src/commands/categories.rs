//! Categories command - list the built-in record categories.

use geofix::record::{CATEGORIES, NO_CATEGORY};

/// Run the categories command.
pub fn run() {
    for category in CATEGORIES {
        if *category == NO_CATEGORY {
            println!("{} (default)", category);
        } else {
            println!("{}", category);
        }
    }
}
