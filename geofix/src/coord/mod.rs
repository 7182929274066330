//! Coordinate module
//!
//! Provides the WGS-84 [`Coordinate`] type shared by every component, plus the
//! small amount of spherical geometry the engine needs: great-circle distance
//! between two fixes and conversion of a metric extent into latitude/longitude
//! deltas for map viewports.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude (mean value).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Degrees to radians conversion factor.
const DEG_TO_RAD: f64 = PI / 180.0;

/// Errors produced when building or parsing coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Cannot parse coordinate '{0}' (expected 'lat,lon')")]
    Parse(String),
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate without range checks.
    ///
    /// Intended for values that came from a location provider, which only
    /// ever reports positions on the globe.
    #[inline]
    pub const fn unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    #[inline]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_m(*self, *other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8}, {:.8}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinate {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordError::Parse(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::Parse(s.to_string()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| CoordError::Parse(s.to_string()))?;
        Coordinate::new(lat, lon)
    }
}

/// Calculate the great-circle distance between two positions.
///
/// Uses the haversine formula, which stays accurate for the sub-meter
/// distances the stall rule compares against.
///
/// # Example
///
/// ```
/// use geofix::coord::{distance_m, Coordinate};
///
/// let a = Coordinate::unchecked(0.0, 0.0);
/// let b = Coordinate::unchecked(1.0, 0.0);
/// let d = distance_m(a, b);
/// assert!((d - 111_195.0).abs() < 10.0);
/// ```
pub fn distance_m(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.latitude * DEG_TO_RAD;
    let lat2_rad = to.latitude * DEG_TO_RAD;
    let delta_lat = (to.latitude - from.latitude) * DEG_TO_RAD;
    let delta_lon = (to.longitude - from.longitude) * DEG_TO_RAD;

    // Haversine formula
    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Latitude delta (degrees) covering `meters` north-south.
#[inline]
pub fn meters_to_lat_delta(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE_LAT
}

/// Longitude delta (degrees) covering `meters` east-west at `latitude`.
///
/// Clamped to 360° near the poles where a degree of longitude collapses.
pub fn meters_to_lon_delta(meters: f64, latitude: f64) -> f64 {
    let meters_per_degree = METERS_PER_DEGREE_LAT * (latitude * DEG_TO_RAD).cos();
    if meters_per_degree <= f64::EPSILON {
        return 360.0;
    }
    (meters / meters_per_degree).min(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_valid_range() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(-37.8136, 144.9631).is_ok());
    }

    #[test]
    fn test_invalid_latitude() {
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(CoordError::InvalidLatitude(91.0))
        );
    }

    #[test]
    fn test_invalid_longitude() {
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordError::InvalidLongitude(-180.5))
        );
    }

    #[test]
    fn test_parse_from_str() {
        let coord: Coordinate = "-33.8688, 151.2093".parse().unwrap();
        assert!((coord.latitude + 33.8688).abs() < 1e-9);
        assert!((coord.longitude - 151.2093).abs() < 1e-9);

        assert!("nonsense".parse::<Coordinate>().is_err());
        assert!("1.0,abc".parse::<Coordinate>().is_err());
        assert!(matches!(
            "95.0,0.0".parse::<Coordinate>(),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_display_uses_eight_decimals() {
        let coord = Coordinate::unchecked(1.5, -2.25);
        assert_eq!(coord.to_string(), "1.50000000, -2.25000000");
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let a = Coordinate::unchecked(53.5, 10.0);
        assert_eq!(distance_m(a, a), 0.0);
    }

    #[test]
    fn test_distance_one_degree_longitude_at_equator() {
        let d = distance_m(
            Coordinate::unchecked(0.0, 0.0),
            Coordinate::unchecked(0.0, 1.0),
        );
        assert!((d - 111_195.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_distance_sub_meter() {
        // ~0.5m north
        let a = Coordinate::unchecked(37.0, -122.0);
        let b = Coordinate::unchecked(37.0 + 0.5 / 111_195.0, -122.0);
        let d = a.distance_to(&b);
        assert!((d - 0.5).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_meters_to_deltas() {
        let lat = meters_to_lat_delta(1000.0);
        assert!((lat - 0.008983).abs() < 1e-5);

        let lon_equator = meters_to_lon_delta(1000.0, 0.0);
        assert!((lon_equator - lat).abs() < 1e-9);

        // Longitude degrees shrink with latitude, so the delta grows
        let lon_60 = meters_to_lon_delta(1000.0, 60.0);
        assert!((lon_60 - 2.0 * lat).abs() < 1e-5);

        assert_eq!(meters_to_lon_delta(1000.0, 90.0), 360.0);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_distance_symmetric(
                lat1 in -90.0..90.0_f64,
                lon1 in -180.0..180.0_f64,
                lat2 in -90.0..90.0_f64,
                lon2 in -180.0..180.0_f64,
            ) {
                let a = Coordinate::unchecked(lat1, lon1);
                let b = Coordinate::unchecked(lat2, lon2);
                let ab = distance_m(a, b);
                let ba = distance_m(b, a);
                prop_assert!((ab - ba).abs() < 1e-6);
                prop_assert!(ab >= 0.0);
                // Never more than half the circumference
                prop_assert!(ab <= PI * EARTH_RADIUS_M + 1.0);
            }
        }
    }
}
