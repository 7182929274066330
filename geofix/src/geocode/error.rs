//! Error types for reverse geocoding.

use thiserror::Error;

/// Errors that can occur while resolving an address.
///
/// Geocoding failures never stop a session; they are recorded on the
/// outcome and the next improved fix retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    /// The response body could not be parsed.
    #[error("Failed to parse response: {0}")]
    Json(String),

    /// The service reported an error for this coordinate.
    #[error("Geocoding service error: {0}")]
    Service(String),
}
