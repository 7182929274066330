//! Accuracy refinement - decides how each new fix affects the session.
//!
//! The tracker is stateless: the session hands it the incoming fix together
//! with the current best fix and the reference fix, and gets back an
//! [`Observation`] with three independent verdicts.
//!
//! # Verdicts
//!
//! - **Improved**: no best fix yet, or the new fix is strictly more accurate
//! - **Converged**: the new fix meets the desired accuracy
//! - **Stalled**: not converged, moved less than the stall distance, and more
//!   than the stall interval has passed since the reference fix
//!
//! A single fix can be improved and converged at once, or stalled without
//! ever having improved anything.

use std::time::Duration;

use super::state::LocationFix;

/// Desired accuracy in meters (nearest ten meters).
pub const DEFAULT_DESIRED_ACCURACY_M: f64 = 10.0;

/// Movement below this distance counts as standing still.
pub const DEFAULT_STALL_DISTANCE_M: f64 = 1.0;

/// Standing still for longer than this gives up on refinement.
pub const DEFAULT_STALL_INTERVAL: Duration = Duration::from_secs(10);

/// Result of observing one fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// The fix should replace the current best fix.
    pub improved: bool,
    /// The fix meets the desired accuracy.
    pub converged: bool,
    /// Refinement stopped making progress.
    pub stalled: bool,
    /// Distance from the reference fix in meters (`f64::MAX` without one).
    pub distance_moved: f64,
}

/// Stateless refinement rules.
#[derive(Debug, Clone)]
pub struct AccuracyRefinementTracker {
    stall_distance_m: f64,
    stall_interval: Duration,
}

impl Default for AccuracyRefinementTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STALL_DISTANCE_M, DEFAULT_STALL_INTERVAL)
    }
}

impl AccuracyRefinementTracker {
    /// Create a tracker with custom stall thresholds.
    pub fn new(stall_distance_m: f64, stall_interval: Duration) -> Self {
        Self {
            stall_distance_m,
            stall_interval,
        }
    }

    /// Evaluate `fix` against the current best and the reference fix.
    pub fn observe(
        &self,
        fix: &LocationFix,
        current_best: Option<&LocationFix>,
        desired_accuracy: f64,
        last_fix: Option<&LocationFix>,
    ) -> Observation {
        let distance_moved = last_fix.map_or(f64::MAX, |last| fix.distance_to(last));

        let improved = current_best.map_or(true, |best| fix.is_more_accurate_than(best));

        let converged = fix.horizontal_accuracy() <= desired_accuracy;

        let stalled = !converged
            && last_fix.is_some_and(|last| {
                distance_moved < self.stall_distance_m && self.waited_too_long(last, fix)
            });

        Observation {
            improved,
            converged,
            stalled,
            distance_moved,
        }
    }

    fn waited_too_long(&self, last: &LocationFix, fix: &LocationFix) -> bool {
        fix.timestamp()
            .signed_duration_since(last.timestamp())
            .to_std()
            .is_ok_and(|elapsed| elapsed > self.stall_interval)
    }
}
