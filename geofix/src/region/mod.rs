//! Map viewport fitting.
//!
//! [`RegionFitCalculator`] computes the region a map should show so that a
//! set of saved locations is visible with a little padding around it. It is
//! independent of the acquisition engine.

use serde::Serialize;

use crate::coord::{meters_to_lat_delta, meters_to_lon_delta, Coordinate};

/// Extent of the viewport shown around a single point, in meters.
pub const DEFAULT_REGION_EXTENT_M: f64 = 1000.0;

/// Padding factor applied to the bounding box of several points.
pub const REGION_PADDING: f64 = 1.1;

/// Height and width of a region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoordinateSpan {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// A map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub center: Coordinate,
    pub span: CoordinateSpan,
}

impl Region {
    /// Region of `extent_m` meters in both directions around `center`.
    pub fn with_extent(center: Coordinate, extent_m: f64) -> Self {
        Self {
            center,
            span: CoordinateSpan {
                latitude_delta: meters_to_lat_delta(extent_m),
                longitude_delta: meters_to_lon_delta(extent_m, center.latitude),
            },
        }
    }

    /// South-west and north-east corners.
    pub fn bounds(&self) -> (Coordinate, Coordinate) {
        let half_lat = self.span.latitude_delta / 2.0;
        let half_lon = self.span.longitude_delta / 2.0;
        (
            Coordinate::unchecked(
                self.center.latitude - half_lat,
                self.center.longitude - half_lon,
            ),
            Coordinate::unchecked(
                self.center.latitude + half_lat,
                self.center.longitude + half_lon,
            ),
        )
    }

    /// Whether `coord` lies inside the region (edges included).
    pub fn contains(&self, coord: Coordinate) -> bool {
        let (south_west, north_east) = self.bounds();
        (south_west.latitude..=north_east.latitude).contains(&coord.latitude)
            && (south_west.longitude..=north_east.longitude).contains(&coord.longitude)
    }
}

/// Fits a viewport to a set of points.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionFitCalculator;

impl RegionFitCalculator {
    /// Region enclosing `points`.
    ///
    /// - no points: default extent around `fallback`
    /// - one point: default extent around it
    /// - more: the bounding box, padded by [`REGION_PADDING`]
    ///
    /// Longitudes are not wrapped; a set straddling the antimeridian gets a
    /// box spanning the long way round.
    pub fn fit(points: &[Coordinate], fallback: Coordinate) -> Region {
        match points {
            [] => Region::with_extent(fallback, DEFAULT_REGION_EXTENT_M),
            [single] => Region::with_extent(*single, DEFAULT_REGION_EXTENT_M),
            [first, rest @ ..] => {
                let init = (first.latitude, first.latitude, first.longitude, first.longitude);
                let (south, north, west, east) =
                    rest.iter().fold(init, |(south, north, west, east), p| {
                        (
                            south.min(p.latitude),
                            north.max(p.latitude),
                            west.min(p.longitude),
                            east.max(p.longitude),
                        )
                    });

                Region {
                    center: Coordinate::unchecked(
                        south + (north - south) / 2.0,
                        west + (east - west) / 2.0,
                    ),
                    span: CoordinateSpan {
                        latitude_delta: (north - south) * REGION_PADDING,
                        longitude_delta: (east - west) * REGION_PADDING,
                    },
                }
            }
        }
    }
}
