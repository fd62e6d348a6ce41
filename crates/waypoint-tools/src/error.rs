//! Error types for waypoint-tools.

use thiserror::Error;

/// Tool Dispatcher error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The named tool is not present in the cached catalog.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// The capability backend itself failed (network, 5xx, malformed body).
    #[error("capability backend error: {0}")]
    Backend(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
