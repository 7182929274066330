//! Saved location records and the persistence port.
//!
//! A [`LocationRecord`] is what gets committed once the user has tagged a
//! fix: the coordinate, its address, a free-text description, a category
//! from [`CATEGORIES`], and an optional photo id continuing from
//! [`PersistencePort::next_photo_id`].

mod store;
mod types;

pub use store::{JsonLinesStore, MemoryStore, PersistencePort, StoreError};
pub use types::{is_known_category, LocationRecord, CATEGORIES, NO_CATEGORY};
