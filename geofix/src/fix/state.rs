//! Core sample and fix types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

/// An unvalidated reading straight from a location provider.
///
/// Providers may hand out cached readings (old timestamp) or readings with a
/// negative accuracy, which means the provider could not determine one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// When the provider took the reading.
    pub timestamp: DateTime<Utc>,
    /// Reported position.
    pub coordinate: Coordinate,
    /// Accuracy radius in meters (negative = invalid).
    pub horizontal_accuracy: f64,
}

impl RawSample {
    /// Create a new raw sample.
    pub fn new(timestamp: DateTime<Utc>, coordinate: Coordinate, horizontal_accuracy: f64) -> Self {
        Self {
            timestamp,
            coordinate,
            horizontal_accuracy,
        }
    }
}

/// A validated position sample with its accuracy radius.
///
/// Fixes are immutable: fields are only readable through accessors, and the
/// only way to build one outside this crate is from a [`RawSample`] via the
/// sample filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationFix {
    timestamp: DateTime<Utc>,
    coordinate: Coordinate,
    horizontal_accuracy: f64,
    sequence_id: u64,
}

impl LocationFix {
    pub(crate) fn from_sample(sample: &RawSample, sequence_id: u64) -> Self {
        Self {
            timestamp: sample.timestamp,
            coordinate: sample.coordinate,
            horizontal_accuracy: sample.horizontal_accuracy,
            sequence_id,
        }
    }

    /// Build a fix directly (for tests).
    #[cfg(test)]
    pub(crate) fn at(
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        horizontal_accuracy: f64,
        sequence_id: u64,
    ) -> Self {
        Self {
            timestamp,
            coordinate: Coordinate::unchecked(latitude, longitude),
            horizontal_accuracy,
            sequence_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }

    /// Accuracy radius in meters (lower is better).
    pub fn horizontal_accuracy(&self) -> f64 {
        self.horizontal_accuracy
    }

    pub fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    /// Returns true if this fix is strictly more accurate than `other`.
    #[inline]
    pub fn is_more_accurate_than(&self, other: &LocationFix) -> bool {
        self.horizontal_accuracy < other.horizontal_accuracy
    }

    /// Great-circle distance to another fix in meters.
    #[inline]
    pub fn distance_to(&self, other: &LocationFix) -> f64 {
        self.coordinate.distance_to(&other.coordinate)
    }
}
