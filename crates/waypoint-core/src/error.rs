//! Error types for waypoint-core.

use thiserror::Error;

/// Orchestrator-level error type.
///
/// Only [`Error::Configuration`] and [`Error::StateViolation`] ever halt a
/// task; every other failure is absorbed at the Tool Dispatcher or Step
/// Executor boundary and surfaced to the model as an observation instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credentials, unsupported provider, or an uninitialized
    /// required collaborator. Fatal: the task cannot start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A §3 invariant was violated. Fatal: this is a bug, not a recoverable
    /// runtime condition.
    #[error("state invariant violated: {0}")]
    StateViolation(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
