//! Session state, reports, and commands.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fix::{LocationFix, RejectReason};
use crate::geocode::{GeocodeError, GeocodeOutcome, GeocodeRequest};
use crate::location::ProviderError;

/// Lifecycle status of an acquisition session.
///
/// ```text
/// Idle ──► Acquiring ──► Refining ──► Converged
///   ▲          │             │            │
///   │          └─────────────┴────────────┴──► Stopped
///   └────────────────── reset ───────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionStatus {
    /// Not started, or reset.
    Idle,
    /// Started, no fix yet.
    Acquiring,
    /// Has a fix, still improving it.
    Refining,
    /// Desired accuracy reached.
    Converged,
    /// Ended by stall, timeout, provider failure, or an explicit stop.
    Stopped,
}

impl SessionStatus {
    /// Returns true while the session consumes samples or geocode results.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Acquiring | Self::Refining | Self::Converged)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Refining => "refining",
            Self::Converged => "converged",
            Self::Stopped => "stopped",
        };
        f.pad(name)
    }
}

/// Error taxonomy shared by reports and diagnostics.
///
/// Only `ProviderFatalError` and `TimeoutError` end up in
/// [`AcquisitionReport::error`]. The other kinds classify failures that the
/// session absorbs and are logged as `kind`: rejected samples, transient
/// provider errors, and failed lookups (which surface as `address_error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    StaleReading,
    InvalidReading,
    ProviderTransientError,
    ProviderFatalError,
    GeocodeError,
    TimeoutError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::StaleReading => "stale reading",
            Self::InvalidReading => "invalid reading",
            Self::ProviderTransientError => "location temporarily unavailable",
            Self::ProviderFatalError => "location provider failed",
            Self::GeocodeError => "address lookup failed",
            Self::TimeoutError => "timed out without a fix",
        };
        f.write_str(text)
    }
}

impl From<RejectReason> for ErrorKind {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::Stale => Self::StaleReading,
            RejectReason::InvalidAccuracy => Self::InvalidReading,
        }
    }
}

impl From<&ProviderError> for ErrorKind {
    fn from(error: &ProviderError) -> Self {
        if error.is_transient() {
            Self::ProviderTransientError
        } else {
            Self::ProviderFatalError
        }
    }
}

impl From<&GeocodeError> for ErrorKind {
    fn from(_: &GeocodeError) -> Self {
        Self::GeocodeError
    }
}

/// Everything an acquisition session knows.
///
/// Owned by [`super::AcquisitionSession`]; read-only to everyone else.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSessionState {
    pub status: SessionStatus,
    /// Most accurate fix so far. Its accuracy never increases within a session.
    pub best_fix: Option<LocationFix>,
    pub last_error: Option<ErrorKind>,
    pub started_at: Option<DateTime<Utc>>,
    pub timeout_deadline: Option<DateTime<Utc>>,
    /// Whether incoming samples are still considered.
    pub accepting_samples: bool,
    /// Whether a timeout is pending.
    pub timer_armed: bool,
    /// Current geocode outcome.
    pub outcome: Option<GeocodeOutcome>,
}

impl Default for AcquisitionSessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            best_fix: None,
            last_error: None,
            started_at: None,
            timeout_deadline: None,
            accepting_samples: false,
            timer_armed: false,
            outcome: None,
        }
    }
}

/// Snapshot pushed to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionReport {
    pub fix: Option<LocationFix>,
    pub address: Option<String>,
    pub status: SessionStatus,
    pub error: Option<ErrorKind>,
    /// A reverse geocode is in flight.
    pub geocoding: bool,
    /// The latest address lookup failed.
    #[serde(skip)]
    pub address_error: Option<GeocodeError>,
}

impl AcquisitionReport {
    /// Text for the address line, matching what a location screen shows.
    pub fn address_line(&self) -> &str {
        match (&self.address, self.geocoding, &self.address_error) {
            (Some(address), _, _) => address,
            (None, true, _) => "Searching for address...",
            (None, false, Some(_)) => "Error finding address",
            (None, false, None) if self.fix.is_some() => "No address found",
            _ => "",
        }
    }
}

/// Side effect the driver must perform after a session call.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Start the location provider.
    StartUpdates,
    /// Stop the location provider.
    StopUpdates,
    /// Arm the session timeout, replacing any armed one.
    ArmTimeout(Duration),
    /// Disarm the session timeout.
    CancelTimeout,
    /// Run a reverse geocode and report back with its id.
    Resolve(GeocodeRequest),
    /// The session resolved its first address.
    FirstAddressFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AcquisitionReport {
        AcquisitionReport {
            fix: None,
            address: None,
            status: SessionStatus::Acquiring,
            error: None,
            geocoding: false,
            address_error: None,
        }
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = AcquisitionSessionState::default();
        assert_eq!(state.status, SessionStatus::Idle);
        assert!(!state.accepting_samples);
        assert!(state.best_fix.is_none());
    }

    #[test]
    fn test_live_statuses() {
        assert!(!SessionStatus::Idle.is_live());
        assert!(SessionStatus::Acquiring.is_live());
        assert!(SessionStatus::Refining.is_live());
        assert!(SessionStatus::Converged.is_live());
        assert!(!SessionStatus::Stopped.is_live());
    }

    #[test]
    fn test_address_line() {
        let mut r = report();
        assert_eq!(r.address_line(), "");

        r.geocoding = true;
        assert_eq!(r.address_line(), "Searching for address...");

        r.geocoding = false;
        r.address_error = Some(GeocodeError::Status(500));
        assert_eq!(r.address_line(), "Error finding address");

        r.address = Some("1 Main St\nSpringfield".to_string());
        assert_eq!(r.address_line(), "1 Main St\nSpringfield");
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionStatus::Converged.to_string(), "converged");
        assert_eq!(ErrorKind::TimeoutError.to_string(), "timed out without a fix");
    }

    #[test]
    fn test_failures_map_to_error_kinds() {
        assert_eq!(ErrorKind::from(RejectReason::Stale), ErrorKind::StaleReading);
        assert_eq!(
            ErrorKind::from(RejectReason::InvalidAccuracy),
            ErrorKind::InvalidReading
        );
        assert_eq!(
            ErrorKind::from(&ProviderError::LocationUnknown),
            ErrorKind::ProviderTransientError
        );
        assert_eq!(
            ErrorKind::from(&ProviderError::Denied),
            ErrorKind::ProviderFatalError
        );
        assert_eq!(
            ErrorKind::from(&GeocodeError::Http("timeout".into())),
            ErrorKind::GeocodeError
        );
    }
}
