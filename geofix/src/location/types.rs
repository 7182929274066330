//! Provider port types.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::fix::RawSample;

/// Errors reported by a location provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not get a position right now but keeps trying.
    #[error("Location currently unknown")]
    LocationUnknown,

    /// The user or system denied access to location services.
    #[error("Location access denied")]
    Denied,

    /// The provider lost its network connection.
    #[error("Network error: {0}")]
    Network(String),

    /// Reading the underlying source failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A recorded track could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl ProviderError {
    /// Returns true if the provider keeps running after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LocationUnknown)
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Something a provider reports.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Sample(RawSample),
    Error(ProviderError),
}

/// Where a running provider delivers its events.
///
/// Wraps a callback that returns `false` once nobody is listening anymore;
/// providers should stop producing when that happens.
#[derive(Clone)]
pub struct ProviderSink {
    deliver: Arc<dyn Fn(ProviderEvent) -> bool + Send + Sync>,
}

impl ProviderSink {
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(ProviderEvent) -> bool + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Deliver one event. Returns `false` if the receiver is gone.
    pub fn send(&self, event: ProviderEvent) -> bool {
        (self.deliver)(event)
    }

    pub fn sample(&self, sample: RawSample) -> bool {
        self.send(ProviderEvent::Sample(sample))
    }

    pub fn error(&self, error: ProviderError) -> bool {
        self.send(ProviderEvent::Error(error))
    }
}

impl fmt::Debug for ProviderSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSink").finish_non_exhaustive()
    }
}

/// Source of position samples.
///
/// `start` is called from within a tokio runtime, so implementations may
/// spawn tasks. Calling `start` on a running provider restarts it with the
/// new sink. `stop` must be idempotent.
pub trait LocationProvider: Send {
    fn start(&mut self, sink: ProviderSink) -> Result<(), ProviderError>;

    fn stop(&mut self);
}

impl<P: LocationProvider + ?Sized> LocationProvider for Box<P> {
    fn start(&mut self, sink: ProviderSink) -> Result<(), ProviderError> {
        (**self).start(sink)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
