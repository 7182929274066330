//! Async driver - the session's control thread.
//!
//! [`SessionDriver`] owns an [`AcquisitionSession`] together with its
//! provider and geocoder, and processes every input strictly in arrival
//! order from a single queue:
//!
//! ```text
//! provider sink ──┐
//! timeout task  ──┼──► mpsc queue ──► SessionDriver ──► AcquisitionSession
//! geocode tasks ──┤                        │
//! SessionHandle ──┘                        └──► executes SessionCommands
//! ```
//!
//! No lock guards session state; only the driver task touches it. Provider
//! runs and timers carry a generation number, bumped on every stop or
//! re-arm, so events from a finished run or a cancelled timer are ignored.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::machine::AcquisitionSession;
use super::observer::{ObserverId, ReportObserver};
use super::state::{AcquisitionReport, SessionCommand};
use crate::geocode::{GeocodeError, GeocodeRequest, Geocoder, Placemark};
use crate::location::{LocationProvider, ProviderEvent, ProviderSink};

/// Errors returned by [`SessionHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The driver task has exited.
    #[error("Session driver is not running")]
    Closed,
}

/// Requests from a [`SessionHandle`].
enum Control {
    Start,
    Stop,
    Reset,
    RegisterObserver(Box<dyn ReportObserver>, oneshot::Sender<ObserverId>),
    DeregisterObserver(ObserverId, oneshot::Sender<bool>),
    Report(oneshot::Sender<AcquisitionReport>),
}

enum DriverEvent {
    Provider {
        generation: u64,
        event: ProviderEvent,
    },
    TimeoutFired {
        generation: u64,
    },
    GeocodeCompleted {
        request_id: u64,
        result: Result<Vec<Placemark>, GeocodeError>,
    },
    Control(Control),
}

/// Clonable handle for controlling a running driver.
///
/// `start`, `stop` and `reset` only enqueue a request, so they are safe to
/// call from observer callbacks and signal handlers.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<DriverEvent>,
}

impl SessionHandle {
    pub fn start(&self) -> Result<(), DriverError> {
        self.send(Control::Start)
    }

    pub fn stop(&self) -> Result<(), DriverError> {
        self.send(Control::Stop)
    }

    pub fn reset(&self) -> Result<(), DriverError> {
        self.send(Control::Reset)
    }

    /// Register an observer on the session.
    pub async fn register_observer(
        &self,
        observer: Box<dyn ReportObserver>,
    ) -> Result<ObserverId, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Control::RegisterObserver(observer, reply))?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Deregister an observer. Returns false if `id` was not registered.
    pub async fn deregister_observer(&self, id: ObserverId) -> Result<bool, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Control::DeregisterObserver(id, reply))?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    /// Current report.
    ///
    /// Answered in queue order, so the result reflects every request sent
    /// through this handle before the call.
    pub async fn report(&self) -> Result<AcquisitionReport, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(Control::Report(reply))?;
        rx.await.map_err(|_| DriverError::Closed)
    }

    fn send(&self, control: Control) -> Result<(), DriverError> {
        self.tx
            .send(DriverEvent::Control(control))
            .map_err(|_| DriverError::Closed)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Owns a session and executes its commands.
pub struct SessionDriver<P> {
    session: AcquisitionSession,
    provider: P,
    geocoder: Arc<dyn Geocoder>,
    events_tx: mpsc::UnboundedSender<DriverEvent>,
    events_rx: mpsc::UnboundedReceiver<DriverEvent>,
    provider_generation: u64,
    timer: Option<JoinHandle<()>>,
    timer_generation: u64,
    first_address: Option<Box<dyn FnMut() + Send>>,
}

impl<P> SessionDriver<P>
where
    P: LocationProvider + 'static,
{
    /// Creates a driver and a handle to control it.
    ///
    /// Nothing happens until [`run`](Self::run) is awaited.
    pub fn new(
        session: AcquisitionSession,
        provider: P,
        geocoder: Arc<dyn Geocoder>,
    ) -> (Self, SessionHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            tx: events_tx.clone(),
        };

        let driver = Self {
            session,
            provider,
            geocoder,
            events_tx,
            events_rx,
            provider_generation: 0,
            timer: None,
            timer_generation: 0,
            first_address: None,
        };

        (driver, handle)
    }

    /// Called once per session when the first address resolves.
    pub fn with_first_address_notifier<F>(mut self, notify: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.first_address = Some(Box::new(notify));
        self
    }

    /// Processes events until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(geocoder = self.geocoder.name(), "Session driver starting");

        loop {
            let event = tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                event = self.events_rx.recv() => event,
            };

            // The driver holds a sender itself, so the queue never closes
            let Some(event) = event else { break };
            self.handle_event(event);
        }

        self.provider.stop();
        self.cancel_timer();
        info!("Session driver stopped");
    }

    fn handle_event(&mut self, event: DriverEvent) {
        let commands = match event {
            DriverEvent::Provider { generation, event } => {
                if generation != self.provider_generation {
                    debug!(generation, "Dropping event from previous provider run");
                    return;
                }
                match event {
                    ProviderEvent::Sample(raw) => self.session.on_sample(raw, Utc::now()),
                    ProviderEvent::Error(error) => self.session.on_provider_error(&error),
                }
            }
            DriverEvent::TimeoutFired { generation } => {
                if generation != self.timer_generation {
                    return;
                }
                self.timer = None;
                self.session.on_timeout(Utc::now())
            }
            DriverEvent::GeocodeCompleted { request_id, result } => {
                self.session
                    .on_geocode_completed(request_id, result, Utc::now())
            }
            DriverEvent::Control(control) => self.handle_control(control),
        };

        self.execute(commands);
    }

    fn handle_control(&mut self, control: Control) -> Vec<SessionCommand> {
        match control {
            Control::Start => self.session.start(Utc::now()),
            Control::Stop => self.session.stop(),
            Control::Reset => self.session.reset(),
            Control::RegisterObserver(observer, reply) => {
                let _ = reply.send(self.session.register_observer(observer));
                Vec::new()
            }
            Control::DeregisterObserver(id, reply) => {
                let _ = reply.send(self.session.deregister_observer(id));
                Vec::new()
            }
            Control::Report(reply) => {
                let _ = reply.send(self.session.report());
                Vec::new()
            }
        }
    }

    fn execute(&mut self, commands: Vec<SessionCommand>) {
        let mut queue = VecDeque::from(commands);

        while let Some(command) = queue.pop_front() {
            match command {
                SessionCommand::StartUpdates => {
                    self.provider_generation += 1;
                    let sink = self.provider_sink(self.provider_generation);
                    if let Err(error) = self.provider.start(sink) {
                        // Feeds back as a provider error, which stops the session
                        queue.extend(self.session.on_provider_error(&error));
                    }
                }
                SessionCommand::StopUpdates => {
                    self.provider.stop();
                    self.provider_generation += 1;
                }
                SessionCommand::ArmTimeout(duration) => self.arm_timer(duration),
                SessionCommand::CancelTimeout => self.cancel_timer(),
                SessionCommand::Resolve(request) => self.spawn_resolve(request),
                SessionCommand::FirstAddressFound => {
                    info!("First address found");
                    if let Some(notify) = self.first_address.as_mut() {
                        notify();
                    }
                }
            }
        }
    }

    fn provider_sink(&self, generation: u64) -> ProviderSink {
        let tx = self.events_tx.clone();
        ProviderSink::new(move |event| {
            tx.send(DriverEvent::Provider { generation, event }).is_ok()
        })
    }

    fn arm_timer(&mut self, duration: Duration) {
        self.cancel_timer();
        let generation = self.timer_generation;
        let tx = self.events_tx.clone();

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(DriverEvent::TimeoutFired { generation });
        }));
    }

    fn cancel_timer(&mut self) {
        self.timer_generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn spawn_resolve(&self, request: GeocodeRequest) {
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.events_tx.clone();

        // Never aborted; a result nobody wants is dropped by the session
        tokio::spawn(async move {
            let result = geocoder.reverse_geocode(request.fix.coordinate()).await;
            let _ = tx.send(DriverEvent::GeocodeCompleted {
                request_id: request.id,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::fix::RawSample;
    use crate::geocode::OfflineGeocoder;
    use crate::location::{ChannelProvider, ProviderError, ProviderFeed};
    use crate::sequence::SequenceGenerator;
    use crate::session::{SessionConfig, SessionStatus};

    struct FailingProvider;

    impl LocationProvider for FailingProvider {
        fn start(&mut self, _sink: ProviderSink) -> Result<(), ProviderError> {
            Err(ProviderError::Denied)
        }

        fn stop(&mut self) {}
    }

    fn spawn_driver() -> (SessionHandle, ProviderFeed, CancellationToken) {
        let session = AcquisitionSession::new(SessionConfig::default(), SequenceGenerator::new());
        let (provider, feed) = ChannelProvider::new();
        let (driver, handle) = SessionDriver::new(session, provider, Arc::new(OfflineGeocoder));
        let shutdown = CancellationToken::new();
        tokio::spawn(driver.run(shutdown.clone()));
        (handle, feed, shutdown)
    }

    #[tokio::test]
    async fn test_start_starts_provider() {
        let (handle, feed, shutdown) = spawn_driver();

        handle.start().unwrap();
        let report = handle.report().await.unwrap();

        assert_eq!(report.status, SessionStatus::Acquiring);
        assert!(feed.is_running());
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_sample_reaches_session() {
        let (handle, feed, shutdown) = spawn_driver();
        handle.start().unwrap();
        handle.report().await.unwrap();

        feed.sample(RawSample::new(
            Utc::now(),
            Coordinate::unchecked(40.4168, -3.7038),
            35.0,
        ));
        let report = handle.report().await.unwrap();

        assert_eq!(report.status, SessionStatus::Refining);
        assert_eq!(report.fix.unwrap().horizontal_accuracy(), 35.0);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_stop_stops_provider() {
        let (handle, feed, shutdown) = spawn_driver();
        handle.start().unwrap();
        handle.stop().unwrap();

        let report = handle.report().await.unwrap();
        assert_eq!(report.status, SessionStatus::Stopped);
        assert!(!feed.is_running());
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_provider_start_failure_stops_session() {
        let session = AcquisitionSession::new(SessionConfig::default(), SequenceGenerator::new());
        let (driver, handle) = SessionDriver::new(session, FailingProvider, Arc::new(OfflineGeocoder));
        let shutdown = CancellationToken::new();
        tokio::spawn(driver.run(shutdown.clone()));

        handle.start().unwrap();
        let report = handle.report().await.unwrap();

        assert_eq!(report.status, SessionStatus::Stopped);
        assert_eq!(report.error, Some(crate::session::ErrorKind::ProviderFatalError));
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_handle_errors_after_shutdown() {
        let (handle, _feed, shutdown) = spawn_driver();
        shutdown.cancel();

        // Wait for the loop to exit and drop its receiver
        for _ in 0..100 {
            if handle.start().is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(handle.report().await, Err(DriverError::Closed));
    }
}
