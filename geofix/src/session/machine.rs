//! The acquisition state machine.
//!
//! [`AcquisitionSession`] owns the filter, tracker, coordinator, and session
//! state. It never performs I/O: every entry point mutates state, notifies
//! observers if the report changed, and returns the [`SessionCommand`]s the
//! caller must execute. Tests drive it synchronously with explicit times.

use chrono::{DateTime, Utc};

use super::config::SessionConfig;
use super::observer::{ObserverId, ObserverRegistry, ReportObserver};
use super::state::{
    AcquisitionReport, AcquisitionSessionState, ErrorKind, SessionCommand, SessionStatus,
};
use crate::fix::{AccuracyRefinementTracker, LocationSampleFilter, RawSample};
use crate::geocode::{GeocodeCoordinator, GeocodeError, Placemark};
use crate::location::ProviderError;
use crate::sequence::SequenceGenerator;

/// One location acquisition, from `start` to convergence or stop.
#[derive(Debug)]
pub struct AcquisitionSession {
    config: SessionConfig,
    filter: LocationSampleFilter,
    tracker: AccuracyRefinementTracker,
    coordinator: GeocodeCoordinator,
    state: AcquisitionSessionState,
    observers: ObserverRegistry,
    last_report: Option<AcquisitionReport>,
}

impl AcquisitionSession {
    /// Create an idle session drawing fix ids from `ids`.
    pub fn new(config: SessionConfig, ids: SequenceGenerator) -> Self {
        let filter = LocationSampleFilter::new(config.max_sample_age, ids);
        let tracker = AccuracyRefinementTracker::new(config.stall_distance_m, config.stall_interval);

        Self {
            config,
            filter,
            tracker,
            coordinator: GeocodeCoordinator::new(),
            state: AcquisitionSessionState::default(),
            observers: ObserverRegistry::default(),
            last_report: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &AcquisitionSessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    /// Current report, as observers last saw it or would see it now.
    pub fn report(&self) -> AcquisitionReport {
        let outcome = self.state.outcome.as_ref();
        AcquisitionReport {
            fix: self.state.best_fix,
            address: outcome.and_then(|o| o.address.clone()),
            status: self.state.status,
            error: self.state.last_error,
            geocoding: self.state.status.is_live() && self.coordinator.is_in_flight(),
            address_error: outcome.and_then(|o| o.error.clone()),
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn ReportObserver>) -> ObserverId {
        self.observers.register(observer)
    }

    pub fn deregister_observer(&mut self, id: ObserverId) -> bool {
        self.observers.deregister(id)
    }

    /// Begin a fresh session. Ignored unless idle or stopped.
    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<SessionCommand> {
        if !matches!(self.state.status, SessionStatus::Idle | SessionStatus::Stopped) {
            tracing::debug!(status = %self.state.status, "Start ignored");
            return Vec::new();
        }

        self.coordinator.reset();
        self.state = AcquisitionSessionState {
            status: SessionStatus::Acquiring,
            started_at: Some(now),
            timeout_deadline: chrono::Duration::from_std(self.config.timeout)
                .ok()
                .map(|timeout| now + timeout),
            accepting_samples: true,
            timer_armed: true,
            ..Default::default()
        };
        tracing::info!(
            desired_accuracy = self.config.desired_accuracy_m,
            timeout_secs = self.config.timeout.as_secs(),
            "Acquisition started"
        );

        self.publish();
        vec![
            SessionCommand::StartUpdates,
            SessionCommand::ArmTimeout(self.config.timeout),
        ]
    }

    /// End the session. Idempotent; ignored while idle.
    ///
    /// An in-flight geocode is left to finish, but its outcome is dropped.
    pub fn stop(&mut self) -> Vec<SessionCommand> {
        if !self.state.status.is_live() {
            return Vec::new();
        }

        tracing::info!(status = %self.state.status, "Acquisition stopped");
        let commands = self.halt();
        self.state.status = SessionStatus::Stopped;
        self.publish();
        commands
    }

    /// Return to idle, discarding all session state.
    pub fn reset(&mut self) -> Vec<SessionCommand> {
        let commands = self.halt();
        self.coordinator.reset();
        self.state = AcquisitionSessionState::default();
        tracing::debug!("Session reset");

        self.publish();
        commands
    }

    /// Feed one raw sample from the provider.
    pub fn on_sample(&mut self, raw: RawSample, now: DateTime<Utc>) -> Vec<SessionCommand> {
        if !self.state.accepting_samples {
            return Vec::new();
        }
        let fix = match self.filter.accept(&raw, now) {
            Ok(fix) => fix,
            Err(reason) => {
                tracing::debug!(
                    kind = %ErrorKind::from(reason),
                    latitude = raw.coordinate.latitude,
                    longitude = raw.coordinate.longitude,
                    accuracy = raw.horizontal_accuracy,
                    "Sample rejected"
                );
                return Vec::new();
            }
        };

        // The stored best fix is both the accuracy baseline and the stall reference
        let best = self.state.best_fix;
        let observation = self.tracker.observe(
            &fix,
            best.as_ref(),
            self.config.desired_accuracy_m,
            best.as_ref(),
        );

        let mut commands = Vec::new();

        if observation.improved {
            tracing::debug!(
                sequence_id = fix.sequence_id(),
                accuracy = fix.horizontal_accuracy(),
                distance_moved = observation.distance_moved,
                "Fix improved"
            );
            self.state.best_fix = Some(fix);
            self.state.last_error = None;
            if !observation.converged {
                self.state.status = SessionStatus::Refining;
            }
            // A stalled fix ends the session, so its address would be discarded
            if !observation.stalled {
                if let Some(request) = self.coordinator.on_fix_available(fix) {
                    commands.push(SessionCommand::Resolve(request));
                }
            }
        }

        if observation.converged {
            tracing::info!(
                accuracy = fix.horizontal_accuracy(),
                desired = self.config.desired_accuracy_m,
                "Desired accuracy reached"
            );
            self.state.accepting_samples = false;
            self.state.status = SessionStatus::Converged;
            commands.push(SessionCommand::StopUpdates);
            if self.state.timer_armed {
                self.state.timer_armed = false;
                commands.push(SessionCommand::CancelTimeout);
            }
        } else if observation.stalled {
            tracing::info!(
                accuracy = self.state.best_fix.map(|f| f.horizontal_accuracy()),
                distance_moved = observation.distance_moved,
                "Refinement stalled"
            );
            commands.extend(self.halt());
            self.state.status = SessionStatus::Stopped;
        }

        self.publish();
        commands
    }

    /// Handle an error reported by the provider.
    pub fn on_provider_error(&mut self, error: &ProviderError) -> Vec<SessionCommand> {
        if !self.state.accepting_samples {
            return Vec::new();
        }
        let kind = ErrorKind::from(error);
        if kind == ErrorKind::ProviderTransientError {
            tracing::debug!(%error, %kind, "Transient provider error ignored");
            return Vec::new();
        }

        tracing::warn!(%error, %kind, "Location provider failed");
        let commands = self.halt();
        self.state.last_error = Some(kind);
        self.state.status = SessionStatus::Stopped;
        self.publish();
        commands
    }

    /// Handle the session timeout firing.
    pub fn on_timeout(&mut self, now: DateTime<Utc>) -> Vec<SessionCommand> {
        if !self.state.timer_armed {
            return Vec::new();
        }
        self.state.timer_armed = false;

        let elapsed = self
            .state
            .started_at
            .map(|started| now.signed_duration_since(started).num_seconds());
        if self.state.best_fix.is_none() {
            tracing::info!(elapsed_secs = elapsed, "Timed out without a fix");
            self.state.last_error = Some(ErrorKind::TimeoutError);
        } else {
            tracing::info!(elapsed_secs = elapsed, "Timed out, keeping best fix");
        }

        let commands = self.halt();
        self.state.status = SessionStatus::Stopped;
        self.publish();
        commands
    }

    /// Handle completion of geocode request `request_id`.
    pub fn on_geocode_completed(
        &mut self,
        request_id: u64,
        result: Result<Vec<Placemark>, GeocodeError>,
        now: DateTime<Utc>,
    ) -> Vec<SessionCommand> {
        if !self.state.status.is_live() {
            tracing::debug!(request_id, status = %self.state.status, "Geocode result discarded");
            return Vec::new();
        }
        let Some(resolution) = self.coordinator.on_resolved(request_id, result, now) else {
            return Vec::new();
        };

        let mut commands = Vec::new();
        if resolution.first_address {
            commands.push(SessionCommand::FirstAddressFound);
        }
        if let Some(next) = resolution.next {
            commands.push(SessionCommand::Resolve(next));
        }
        if let Some(error) = &resolution.outcome.error {
            tracing::debug!(request_id, kind = %ErrorKind::from(error), "Address cleared");
        }
        self.state.outcome = Some(resolution.outcome);

        self.publish();
        commands
    }

    /// Stop sampling and disarm the timer, returning the matching commands.
    fn halt(&mut self) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        if self.state.accepting_samples {
            self.state.accepting_samples = false;
            commands.push(SessionCommand::StopUpdates);
        }
        if self.state.timer_armed {
            self.state.timer_armed = false;
            commands.push(SessionCommand::CancelTimeout);
        }
        commands
    }

    fn publish(&mut self) {
        let report = self.report();
        if self.last_report.as_ref() == Some(&report) {
            return;
        }
        self.observers.notify(&report);
        self.last_report = Some(report);
    }
}
