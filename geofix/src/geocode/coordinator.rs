//! Single-flight reverse geocoding with a "pending latest" slot.
//!
//! At most one request is outstanding. Fixes arriving while a request is in
//! flight overwrite the pending slot; only the most recent one is kept. When
//! the in-flight request resolves, the pending fix is dispatched next unless
//! it sits at exactly the position that was just resolved.
//!
//! Every request carries an id. Completions whose id does not match the
//! in-flight request (late answers from before a reset) are ignored.

use chrono::{DateTime, Utc};

use super::error::GeocodeError;
use super::placemark::Placemark;
use crate::fix::LocationFix;

/// A request the caller must execute against the geocoder port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeRequest {
    /// Correlation id, echoed back in [`GeocodeCoordinator::on_resolved`].
    pub id: u64,
    /// Fix whose coordinate should be resolved.
    pub fix: LocationFix,
}

/// Result of one completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeOutcome {
    /// The fix this outcome describes.
    pub source_fix: LocationFix,
    /// Last placemark returned, which is the most specific one.
    pub placemark: Option<Placemark>,
    /// Two-line address rendered from the placemark.
    pub address: Option<String>,
    /// Failure reported by the geocoder.
    pub error: Option<GeocodeError>,
    /// When the outcome was recorded.
    pub resolved_at: DateTime<Utc>,
}

impl GeocodeOutcome {
    fn new(
        source_fix: LocationFix,
        result: Result<Vec<Placemark>, GeocodeError>,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        let (placemark, error) = match result {
            Ok(mut placemarks) => (placemarks.pop(), None),
            Err(e) => (None, Some(e)),
        };
        let address = placemark.as_ref().map(Placemark::two_line);

        Self {
            source_fix,
            placemark,
            address,
            error,
            resolved_at,
        }
    }

    /// Returns true if the geocoder failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// What happened when a request resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The new current outcome.
    pub outcome: GeocodeOutcome,
    /// True exactly once per session: the first outcome carrying a placemark.
    pub first_address: bool,
    /// Follow-up request for the pending fix, if one was dispatched.
    pub next: Option<GeocodeRequest>,
}

/// Single-flight geocoding state.
#[derive(Debug, Default)]
pub struct GeocodeCoordinator {
    next_request_id: u64,
    in_flight: Option<GeocodeRequest>,
    pending_latest: Option<LocationFix>,
    address_found: bool,
}

impl GeocodeCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer an improved fix.
    ///
    /// Returns a request to execute when nothing is in flight. Otherwise the
    /// fix replaces whatever was pending and `None` is returned.
    pub fn on_fix_available(&mut self, fix: LocationFix) -> Option<GeocodeRequest> {
        if self.in_flight.is_some() {
            tracing::trace!(sequence_id = fix.sequence_id(), "Geocode busy, fix pending");
            self.pending_latest = Some(fix);
            return None;
        }
        Some(self.dispatch(fix))
    }

    /// Record the result of request `id`.
    ///
    /// Returns `None` if `id` is not the in-flight request.
    pub fn on_resolved(
        &mut self,
        id: u64,
        result: Result<Vec<Placemark>, GeocodeError>,
        now: DateTime<Utc>,
    ) -> Option<Resolution> {
        let request = match self.in_flight {
            Some(request) if request.id == id => request,
            _ => {
                tracing::debug!(request_id = id, "Ignoring unmatched geocode completion");
                return None;
            }
        };
        self.in_flight = None;

        let outcome = GeocodeOutcome::new(request.fix, result, now);
        if let Some(error) = &outcome.error {
            tracing::warn!(request_id = id, error = %error, "Reverse geocoding failed");
        }

        let first_address = outcome.placemark.is_some() && !self.address_found;
        if first_address {
            self.address_found = true;
        }

        let next = self
            .pending_latest
            .take()
            .filter(|pending| pending.distance_to(&request.fix) > 0.0)
            .map(|pending| self.dispatch(pending));

        Some(Resolution {
            outcome,
            first_address,
            next,
        })
    }

    /// Forget all state except the request id counter.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.pending_latest = None;
        self.address_found = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&GeocodeRequest> {
        self.in_flight.as_ref()
    }

    pub fn pending(&self) -> Option<&LocationFix> {
        self.pending_latest.as_ref()
    }

    /// Whether any outcome so far carried a placemark.
    pub fn address_found(&self) -> bool {
        self.address_found
    }

    fn dispatch(&mut self, fix: LocationFix) -> GeocodeRequest {
        let request = GeocodeRequest {
            id: self.next_request_id,
            fix,
        };
        self.next_request_id += 1;
        self.in_flight = Some(request);
        tracing::debug!(
            request_id = request.id,
            sequence_id = fix.sequence_id(),
            "Dispatching reverse geocode"
        );
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(seq: u64, lat: f64, accuracy: f64) -> LocationFix {
        LocationFix::at(Utc::now(), lat, 10.0, accuracy, seq)
    }

    fn placemark(street: &str) -> Placemark {
        Placemark {
            thoroughfare: Some(street.to_string()),
            locality: Some("Hamburg".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_dispatches_immediately() {
        let mut coordinator = GeocodeCoordinator::new();
        let request = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();

        assert_eq!(request.id, 0);
        assert!(coordinator.is_in_flight());
        assert!(coordinator.pending().is_none());
    }

    #[test]
    fn test_busy_keeps_only_latest_pending() {
        let mut coordinator = GeocodeCoordinator::new();
        coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();

        assert!(coordinator.on_fix_available(fix(1, 53.6, 40.0)).is_none());
        assert!(coordinator.on_fix_available(fix(2, 53.7, 20.0)).is_none());

        assert_eq!(coordinator.pending().unwrap().sequence_id(), 2);
    }

    #[test]
    fn test_resolution_dispatches_pending() {
        let mut coordinator = GeocodeCoordinator::new();
        let first = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();
        coordinator.on_fix_available(fix(1, 53.6, 40.0));
        coordinator.on_fix_available(fix(2, 53.7, 20.0));

        let resolution = coordinator
            .on_resolved(first.id, Ok(vec![placemark("Jungfernstieg")]), Utc::now())
            .unwrap();

        let next = resolution.next.unwrap();
        assert_eq!(next.fix.sequence_id(), 2);
        assert_eq!(next.id, 1);
        assert!(coordinator.is_in_flight());
        assert!(coordinator.pending().is_none());
    }

    #[test]
    fn test_pending_at_same_position_is_dropped() {
        let mut coordinator = GeocodeCoordinator::new();
        let first = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();
        coordinator.on_fix_available(fix(1, 53.5, 30.0));

        let resolution = coordinator
            .on_resolved(first.id, Ok(vec![placemark("Jungfernstieg")]), Utc::now())
            .unwrap();

        assert!(resolution.next.is_none());
        assert!(!coordinator.is_in_flight());
        assert!(coordinator.pending().is_none());
    }

    #[test]
    fn test_first_address_fires_once() {
        let mut coordinator = GeocodeCoordinator::new();

        let a = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();
        let first = coordinator
            .on_resolved(a.id, Ok(vec![placemark("A")]), Utc::now())
            .unwrap();
        assert!(first.first_address);

        let b = coordinator.on_fix_available(fix(1, 53.6, 30.0)).unwrap();
        let second = coordinator
            .on_resolved(b.id, Ok(vec![placemark("B")]), Utc::now())
            .unwrap();
        assert!(!second.first_address);
        assert!(coordinator.address_found());
    }

    #[test]
    fn test_empty_result_is_not_an_address() {
        let mut coordinator = GeocodeCoordinator::new();
        let a = coordinator.on_fix_available(fix(0, 0.0, 60.0)).unwrap();

        let resolution = coordinator.on_resolved(a.id, Ok(Vec::new()), Utc::now()).unwrap();
        assert!(!resolution.first_address);
        assert!(resolution.outcome.address.is_none());
        assert!(!resolution.outcome.is_error());
    }

    #[test]
    fn test_failure_is_recorded_and_clears_address() {
        let mut coordinator = GeocodeCoordinator::new();
        let a = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();
        coordinator.on_resolved(a.id, Ok(vec![placemark("A")]), Utc::now());

        let b = coordinator.on_fix_available(fix(1, 53.6, 30.0)).unwrap();
        let resolution = coordinator
            .on_resolved(b.id, Err(GeocodeError::Status(503)), Utc::now())
            .unwrap();

        assert_eq!(resolution.outcome.error, Some(GeocodeError::Status(503)));
        assert!(resolution.outcome.address.is_none());
        assert_eq!(resolution.outcome.source_fix.sequence_id(), 1);
    }

    #[test]
    fn test_most_specific_placemark_is_last() {
        let mut coordinator = GeocodeCoordinator::new();
        let a = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();

        let resolution = coordinator
            .on_resolved(a.id, Ok(vec![placemark("Outer"), placemark("Inner")]), Utc::now())
            .unwrap();
        assert_eq!(
            resolution.outcome.address.as_deref(),
            Some("Inner\nHamburg")
        );
    }

    #[test]
    fn test_unmatched_completion_is_ignored() {
        let mut coordinator = GeocodeCoordinator::new();
        let a = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();

        assert!(coordinator
            .on_resolved(a.id + 7, Ok(vec![placemark("X")]), Utc::now())
            .is_none());
        assert!(coordinator.is_in_flight());
        assert!(!coordinator.address_found());
    }

    #[test]
    fn test_reset_keeps_ids_unique() {
        let mut coordinator = GeocodeCoordinator::new();
        let old = coordinator.on_fix_available(fix(0, 53.5, 60.0)).unwrap();

        coordinator.reset();
        assert!(!coordinator.is_in_flight());

        let fresh = coordinator.on_fix_available(fix(1, 53.6, 60.0)).unwrap();
        assert_ne!(old.id, fresh.id);

        // Late answer for the request from before the reset
        assert!(coordinator
            .on_resolved(old.id, Ok(vec![placemark("Old")]), Utc::now())
            .is_none());
        assert!(coordinator
            .on_resolved(fresh.id, Ok(vec![placemark("New")]), Utc::now())
            .unwrap()
            .first_address);
    }
}
