//! Geocoder port.

use std::future::Future;
use std::pin::Pin;

use super::error::GeocodeError;
use super::placemark::Placemark;
use crate::coord::Coordinate;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Reverse geocoding service.
///
/// Implementations resolve a coordinate into zero or more placemarks, most
/// specific last. The session shows the last placemark as the address. An
/// empty list is a valid answer and means no address is known for the
/// coordinate.
///
/// The session never calls this directly. The driver awaits it on a spawned
/// task and feeds the result back through the control loop.
pub trait Geocoder: Send + Sync {
    /// Resolve `coordinate` to placemarks.
    fn reverse_geocode(&self, coordinate: Coordinate)
        -> BoxFuture<'_, Result<Vec<Placemark>, GeocodeError>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Geocoder that never finds an address.
///
/// Used for offline runs, so a session still converges on a fix.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    fn reverse_geocode(
        &self,
        _coordinate: Coordinate,
    ) -> BoxFuture<'_, Result<Vec<Placemark>, GeocodeError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn name(&self) -> &str {
        "offline"
    }
}
