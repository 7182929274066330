//! Hand-fed provider.

use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{LocationProvider, ProviderError, ProviderEvent, ProviderSink};
use crate::fix::RawSample;

type SharedSink = Arc<Mutex<Option<ProviderSink>>>;

/// Provider whose events are pushed through a [`ProviderFeed`].
///
/// Events fed while the provider is stopped are dropped, like readings from
/// a device nobody is listening to.
#[derive(Debug)]
pub struct ChannelProvider {
    sink: SharedSink,
}

/// Feeding side of a [`ChannelProvider`].
#[derive(Debug, Clone)]
pub struct ProviderFeed {
    sink: SharedSink,
}

impl ChannelProvider {
    /// Create a provider and its feed.
    pub fn new() -> (Self, ProviderFeed) {
        let sink = SharedSink::default();
        (
            Self {
                sink: Arc::clone(&sink),
            },
            ProviderFeed { sink },
        )
    }
}

impl LocationProvider for ChannelProvider {
    fn start(&mut self, sink: ProviderSink) -> Result<(), ProviderError> {
        *self.sink.lock() = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.lock().take();
    }
}

impl ProviderFeed {
    /// Push an event. Returns `false` if the provider is not running.
    pub fn send(&self, event: ProviderEvent) -> bool {
        // Clone out of the lock so the callback never runs under it
        let sink = self.sink.lock().clone();
        sink.is_some_and(|sink| sink.send(event))
    }

    pub fn sample(&self, sample: RawSample) -> bool {
        self.send(ProviderEvent::Sample(sample))
    }

    pub fn error(&self, error: ProviderError) -> bool {
        self.send(ProviderEvent::Error(error))
    }

    /// Whether the provider is between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.sink.lock().is_some()
    }
}
