//! Error types for waypoint-llm

use thiserror::Error;

/// Provider Adapter error type
#[derive(Debug, Error)]
pub enum Error {
    /// Requested provider has no matching dialect implementation
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Credentials for the selected provider were not supplied
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Transport/HTTP failure talking to the provider
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the provider
    #[error("api error: {0}")]
    Api(String),

    /// Provider signalled rate limiting (429)
    #[error("rate limit exceeded")]
    RateLimit,

    /// Response body did not match the expected provider schema
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A model call exceeded its deadline
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is recoverable at the call site (step-fatal, not task-fatal).
    ///
    /// `UnsupportedProvider` and `NotConfigured` are configuration errors and are
    /// always fatal; everything else surfaces to the caller as a recoverable
    /// per-call failure.
    #[must_use]
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedProvider(_) | Self::NotConfigured(_))
    }
}
