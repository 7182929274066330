//! Sample filter - drops readings the tracker must never see.
//!
//! Location providers replay their last known position when updates start,
//! and occasionally report a reading whose accuracy they could not determine.
//! Both kinds are discarded here, before any refinement logic runs.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::state::{LocationFix, RawSample};
use crate::sequence::SequenceGenerator;

/// Readings older than this are treated as cached.
pub const DEFAULT_MAX_SAMPLE_AGE: Duration = Duration::from_secs(5);

/// Why a raw sample was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The reading is older than the maximum sample age.
    Stale,
    /// The provider reported a negative accuracy.
    InvalidAccuracy,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => write!(f, "stale reading"),
            Self::InvalidAccuracy => write!(f, "invalid accuracy"),
        }
    }
}

/// Validates raw samples and turns accepted ones into fixes.
#[derive(Debug, Clone)]
pub struct LocationSampleFilter {
    max_age: Duration,
    ids: SequenceGenerator,
}

impl LocationSampleFilter {
    /// Create a filter drawing fix ids from `ids`.
    pub fn new(max_age: Duration, ids: SequenceGenerator) -> Self {
        Self { max_age, ids }
    }

    /// Maximum sample age before a reading counts as cached.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Decide whether `raw` is usable at time `now`.
    ///
    /// A timestamp in the future (clock skew between provider and host) is
    /// not considered stale.
    pub fn classify(&self, raw: &RawSample, now: DateTime<Utc>) -> Result<(), RejectReason> {
        let age = now.signed_duration_since(raw.timestamp);
        if age.to_std().is_ok_and(|age| age > self.max_age) {
            return Err(RejectReason::Stale);
        }
        if raw.horizontal_accuracy < 0.0 || raw.horizontal_accuracy.is_nan() {
            return Err(RejectReason::InvalidAccuracy);
        }
        Ok(())
    }

    /// Accept `raw` as a fix, or say why it must be dropped.
    ///
    /// Only accepted samples consume a sequence id.
    pub fn accept(&self, raw: &RawSample, now: DateTime<Utc>) -> Result<LocationFix, RejectReason> {
        self.classify(raw, now)?;
        Ok(LocationFix::from_sample(raw, self.ids.next_id()))
    }
}

impl Default for LocationSampleFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLE_AGE, SequenceGenerator::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    fn sample_at(timestamp: DateTime<Utc>, accuracy: f64) -> RawSample {
        RawSample::new(timestamp, Coordinate::unchecked(53.5, 10.0), accuracy)
    }

    #[test]
    fn test_fresh_valid_sample_is_accepted() {
        let filter = LocationSampleFilter::default();
        let now = Utc::now();

        let fix = filter.accept(&sample_at(now, 30.0), now).unwrap();
        assert_eq!(fix.horizontal_accuracy(), 30.0);
        assert_eq!(fix.timestamp(), now);
    }

    #[test]
    fn test_six_second_old_sample_is_stale() {
        let filter = LocationSampleFilter::default();
        let now = Utc::now();
        let raw = sample_at(now - chrono::Duration::seconds(6), 30.0);

        assert_eq!(filter.classify(&raw, now), Err(RejectReason::Stale));
        assert!(filter.accept(&raw, now).is_err());
    }

    #[test]
    fn test_exactly_max_age_is_not_stale() {
        let filter = LocationSampleFilter::default();
        let now = Utc::now();
        let raw = sample_at(now - chrono::Duration::seconds(5), 30.0);

        assert_eq!(filter.classify(&raw, now), Ok(()));
    }

    #[test]
    fn test_future_timestamp_is_not_stale() {
        let filter = LocationSampleFilter::default();
        let now = Utc::now();
        let raw = sample_at(now + chrono::Duration::seconds(2), 30.0);

        assert!(filter.accept(&raw, now).is_ok());
    }

    #[test]
    fn test_negative_accuracy_is_invalid() {
        let filter = LocationSampleFilter::default();
        let now = Utc::now();
        let raw = sample_at(now, -1.0);

        assert_eq!(filter.classify(&raw, now), Err(RejectReason::InvalidAccuracy));
        assert!(filter.accept(&raw, now).is_err());
    }

    #[test]
    fn test_zero_accuracy_is_valid() {
        let filter = LocationSampleFilter::default();
        let now = Utc::now();
        assert!(filter.accept(&sample_at(now, 0.0), now).is_ok());
    }

    #[test]
    fn test_accepted_fixes_get_sequential_ids() {
        let ids = SequenceGenerator::starting_at(100);
        let filter = LocationSampleFilter::new(DEFAULT_MAX_SAMPLE_AGE, ids.clone());
        let now = Utc::now();

        let a = filter.accept(&sample_at(now, 10.0), now).unwrap();
        // Rejected samples do not consume an id
        assert!(filter.accept(&sample_at(now, -5.0), now).is_err());
        let b = filter.accept(&sample_at(now, 10.0), now).unwrap();

        assert_eq!(a.sequence_id(), 100);
        assert_eq!(b.sequence_id(), 101);
        assert_eq!(ids.peek(), 102);
    }

    #[test]
    fn test_custom_max_age() {
        let filter = LocationSampleFilter::new(Duration::from_secs(30), SequenceGenerator::new());
        let now = Utc::now();
        let raw = sample_at(now - chrono::Duration::seconds(20), 10.0);

        assert!(filter.accept(&raw, now).is_ok());
    }
}
