//! GeoFix - converge noisy position samples into one fix and an address.
//!
//! A location provider delivers a burst of readings of uneven quality:
//! cached positions from minutes ago, readings with no usable accuracy, and
//! a sequence of fixes that slowly tighten. This library reconciles that
//! stream into a single best-known fix, resolves it to a street address
//! through a reverse geocoder, and gives up cleanly when accuracy stops
//! improving or time runs out.
//!
//! # Modules
//!
//! - [`fix`] - sample validation and accuracy refinement
//! - [`geocode`] - single-flight reverse geocoding and address formatting
//! - [`session`] - the acquisition state machine and its async driver
//! - [`location`] - the location provider port and adapters
//! - [`region`] - fitting a map viewport to a set of points
//! - [`record`] - saved locations and the persistence port
//! - [`config`] - `~/.geofix/config.ini`
//! - [`logging`] - tracing setup

pub mod config;
pub mod coord;
pub mod fix;
pub mod geocode;
pub mod location;
pub mod logging;
pub mod record;
pub mod region;
pub mod sequence;
pub mod session;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
