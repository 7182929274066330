//! Position fixes: validation and accuracy refinement.
//!
//! A location provider delivers a noisy stream of [`RawSample`]s. This module
//! turns them into validated [`LocationFix`]es and decides, fix by fix, how
//! the best-known position evolves:
//!
//! ```text
//! RawSample ──► LocationSampleFilter ──► LocationFix ──► AccuracyRefinementTracker
//!               (stale / invalid dropped)                 (improved, converged, stalled)
//! ```
//!
//! # Selection Logic
//!
//! 1. Strictly better accuracy (lower meters) replaces the best fix
//! 2. Accuracy at or under the desired threshold converges the session
//! 3. Barely moving for longer than the stall interval gives up early
//!
//! # Components
//!
//! - [`state`] - `RawSample` and `LocationFix`
//! - [`filter`] - `LocationSampleFilter` rejecting cached and invalid readings
//! - [`tracker`] - `AccuracyRefinementTracker` and its `Observation`

mod filter;
mod state;
mod tracker;

pub use filter::{LocationSampleFilter, RejectReason, DEFAULT_MAX_SAMPLE_AGE};
pub use state::{LocationFix, RawSample};
pub use tracker::{
    AccuracyRefinementTracker, Observation, DEFAULT_DESIRED_ACCURACY_M, DEFAULT_STALL_DISTANCE_M,
    DEFAULT_STALL_INTERVAL,
};
