//! Acquisition sessions.
//!
//! A session turns a stream of raw samples into one best fix and an address
//! within a bounded time. It is split in two layers:
//!
//! - [`AcquisitionSession`] - a synchronous state machine. Every call mutates
//!   state, notifies observers, and returns [`SessionCommand`]s. No I/O.
//! - [`SessionDriver`] - the async control thread. Owns the machine, the
//!   [`LocationProvider`](crate::location::LocationProvider) and the
//!   [`Geocoder`](crate::geocode::Geocoder), serializes their events onto one
//!   queue, and executes the returned commands.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use geofix::geocode::OfflineGeocoder;
//! use geofix::location::ChannelProvider;
//! use geofix::sequence::SequenceGenerator;
//! use geofix::session::{AcquisitionReport, AcquisitionSession, SessionConfig, SessionDriver};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = AcquisitionSession::new(SessionConfig::default(), SequenceGenerator::new());
//! let (provider, _feed) = ChannelProvider::new();
//! let (driver, handle) = SessionDriver::new(session, provider, Arc::new(OfflineGeocoder));
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(driver.run(shutdown.clone()));
//!
//! handle
//!     .register_observer(Box::new(|report: &AcquisitionReport| {
//!         println!("{}: {}", report.status, report.address_line());
//!     }))
//!     .await?;
//! handle.start()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod driver;
mod machine;
mod observer;
mod state;

pub use config::{SessionConfig, DEFAULT_SESSION_TIMEOUT};
pub use driver::{DriverError, SessionDriver, SessionHandle};
pub use machine::AcquisitionSession;
pub use observer::{BroadcastObserver, ObserverId, ReportObserver};
pub use state::{
    AcquisitionReport, AcquisitionSessionState, ErrorKind, SessionCommand, SessionStatus,
};
