//! Location provider port and adapters.
//!
//! A [`LocationProvider`] pushes [`ProviderEvent`]s into a [`ProviderSink`]
//! between `start` and `stop`. The session driver owns the provider and tags
//! every event with the run it belongs to, so events from a previous run are
//! never mistaken for current ones.
//!
//! # Adapters
//!
//! - [`ReplayProvider`] - replays a recorded JSON-lines track with its
//!   original timing
//! - [`ChannelProvider`] - fed by hand through a [`ProviderFeed`], for tests
//!   and embedding

mod channel;
mod replay;
mod types;

pub use channel::{ChannelProvider, ProviderFeed};
pub use replay::{ReplayProvider, ReplayStep, ReplayStepKind};
pub use types::{LocationProvider, ProviderError, ProviderEvent, ProviderSink};
