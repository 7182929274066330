//! Reverse geocoding: turning a fix into a street address.
//!
//! # Architecture
//!
//! ```text
//! AcquisitionSession
//!     │  on_fix_available(fix)
//!     ▼
//! GeocodeCoordinator ──► GeocodeRequest ──► SessionDriver ──► Geocoder (port)
//!     ▲                                                          │
//!     └──────────── on_resolved(id, result) ◄────────────────────┘
//! ```
//!
//! The coordinator is a plain state machine enforcing single-flight: while a
//! request is out, newer fixes only replace a single "pending latest" slot,
//! which is resolved once the current request completes. The driver is the
//! only component that actually awaits the [`Geocoder`] port.
//!
//! # Components
//!
//! - [`client`] - `Geocoder` port trait and `OfflineGeocoder`
//! - [`nominatim`] - `NominatimGeocoder` for OpenStreetMap-compatible services
//! - [`placemark`] - `Placemark` and its address renderings
//! - [`coordinator`] - `GeocodeCoordinator`, requests, outcomes

mod client;
mod coordinator;
mod error;
mod nominatim;
mod placemark;

pub use client::{BoxFuture, Geocoder, OfflineGeocoder};
pub use coordinator::{GeocodeCoordinator, GeocodeOutcome, GeocodeRequest, Resolution};
pub use error::GeocodeError;
pub use nominatim::{NominatimConfig, NominatimGeocoder, DEFAULT_NOMINATIM_URL};
pub use placemark::Placemark;
