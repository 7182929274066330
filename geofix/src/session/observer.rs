//! Report observers.
//!
//! Observers are registered on the session and called synchronously on the
//! control thread whenever the report changes. An observer that wants to
//! stop the session from its callback does so through a
//! [`super::SessionHandle`], which only enqueues the request.

use tokio::sync::broadcast;

use super::state::AcquisitionReport;

/// Receives session reports.
pub trait ReportObserver: Send {
    fn on_report(&mut self, report: &AcquisitionReport);
}

impl<F> ReportObserver for F
where
    F: FnMut(&AcquisitionReport) + Send,
{
    fn on_report(&mut self, report: &AcquisitionReport) {
        self(report)
    }
}

/// Handle returned by registration, used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Forwards reports onto a broadcast channel.
///
/// Slow subscribers lag and lose old reports instead of blocking the session.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<AcquisitionReport>,
}

impl BroadcastObserver {
    /// Create an observer and its first subscriber.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<AcquisitionReport>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx }, rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AcquisitionReport> {
        self.tx.subscribe()
    }
}

impl ReportObserver for BroadcastObserver {
    fn on_report(&mut self, report: &AcquisitionReport) {
        // No subscribers is not an error
        let _ = self.tx.send(report.clone());
    }
}

/// Ordered set of observers.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn ReportObserver>)>,
}

impl ObserverRegistry {
    pub fn register(&mut self, observer: Box<dyn ReportObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn deregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, report: &AcquisitionReport) {
        for (_, observer) in &mut self.observers {
            observer.on_report(report);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}
