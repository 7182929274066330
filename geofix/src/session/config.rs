//! Session thresholds.

use std::time::Duration;

use crate::fix::{
    DEFAULT_DESIRED_ACCURACY_M, DEFAULT_MAX_SAMPLE_AGE, DEFAULT_STALL_DISTANCE_M,
    DEFAULT_STALL_INTERVAL,
};

/// Give up on a session that has not converged after this long.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Thresholds that drive an [`super::AcquisitionSession`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use geofix::session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_desired_accuracy(25.0)
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.desired_accuracy_m, 25.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Accuracy in meters at which the session converges.
    pub desired_accuracy_m: f64,
    /// Readings older than this are cached and dropped.
    pub max_sample_age: Duration,
    /// Movement below this counts as standing still.
    pub stall_distance_m: f64,
    /// Standing still for longer than this stops the session.
    pub stall_interval: Duration,
    /// Session timeout.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            desired_accuracy_m: DEFAULT_DESIRED_ACCURACY_M,
            max_sample_age: DEFAULT_MAX_SAMPLE_AGE,
            stall_distance_m: DEFAULT_STALL_DISTANCE_M,
            stall_interval: DEFAULT_STALL_INTERVAL,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn with_desired_accuracy(mut self, meters: f64) -> Self {
        self.desired_accuracy_m = meters;
        self
    }

    pub fn with_max_sample_age(mut self, age: Duration) -> Self {
        self.max_sample_age = age;
        self
    }

    pub fn with_stall_distance(mut self, meters: f64) -> Self {
        self.stall_distance_m = meters;
        self
    }

    pub fn with_stall_interval(mut self, interval: Duration) -> Self {
        self.stall_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.desired_accuracy_m, 10.0);
        assert_eq!(config.max_sample_age, Duration::from_secs(5));
        assert_eq!(config.stall_distance_m, 1.0);
        assert_eq!(config.stall_interval, Duration::from_secs(10));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_max_sample_age(Duration::from_secs(2))
            .with_stall_distance(3.0)
            .with_stall_interval(Duration::from_secs(20));
        assert_eq!(config.max_sample_age, Duration::from_secs(2));
        assert_eq!(config.stall_distance_m, 3.0);
        assert_eq!(config.stall_interval, Duration::from_secs(20));
    }
}
