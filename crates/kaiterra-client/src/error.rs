//! Client errors.

/// Errors surfaced by [`crate::KaiterraClient`].
///
/// Nothing is retried internally; every failure maps to exactly one of
/// these kinds so callers can match on what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum KaiterraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid sensor ID: {0}")]
    InvalidSensorId(String),

    #[error("Too many sensor IDs: {0} (the API accepts at most 100 per batch)")]
    TooManyIds(usize),

    #[error("Authentication failed: HTTP {0}")]
    Auth(u16),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Parse error: {0}")]
    Parse(String),
}
