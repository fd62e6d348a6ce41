//! The external capability (tool-execution) backend interface.
//!
//! The backend itself -- credential handshake, individual tool semantics --
//! is explicitly out of scope; only the three operations it must expose are
//! modeled here, as a trait the Tool Dispatcher consumes.

use crate::catalog::{CatalogFormat, ToolDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of requesting authorization for `(tool_name, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Authorization is already in place; the tool may be executed.
    Completed,
    /// Authorization is outstanding; `url` (if present) is where the user
    /// completes it.
    Pending {
        /// URL to send the user to, if the backend provided one.
        url: Option<String>,
    },
}

/// The value or embedded error produced by one tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Present when the backend reports an embedded (non-transport) error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full result of `execute`.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Whether the backend call itself succeeded (distinct from an embedded
    /// error inside a successful call).
    pub success: bool,
    /// Backend-reported status string, surfaced verbatim on failure.
    pub status: String,
    /// The execution's output, when `success` is true.
    pub output: Option<ToolOutput>,
}

/// The capability (tool) backend the Tool Dispatcher routes non-meta tool
/// calls to.
#[async_trait]
pub trait CapabilityBackend: Send + Sync {
    /// Fetch the enabled tool catalog for this task.
    async fn list_tools(&self, format: CatalogFormat) -> crate::error::Result<Vec<ToolDescriptor>>;

    /// Request authorization for a tool on behalf of a user.
    async fn authorize(&self, tool_name: &str, user_id: &str) -> crate::error::Result<AuthStatus>;

    /// Block until a pending authorization completes. Only called when
    /// interactive mode is enabled.
    async fn wait_for_authorization(
        &self,
        tool_name: &str,
        user_id: &str,
    ) -> crate::error::Result<()>;

    /// Execute a tool with already-structured arguments.
    async fn execute(
        &self,
        tool_name: &str,
        input: serde_json::Value,
        user_id: &str,
    ) -> crate::error::Result<ExecutionOutcome>;
}

/// Backend used when no `tool_backend_key` is configured: the catalog is
/// always empty (only meta-tools are offered) and any dispatch attempt is
/// unreachable in practice, but is handled gracefully rather than panicking
/// if one ever occurs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCapabilityBackend;

#[async_trait]
impl CapabilityBackend for NullCapabilityBackend {
    async fn list_tools(&self, _format: CatalogFormat) -> crate::error::Result<Vec<ToolDescriptor>> {
        Ok(Vec::new())
    }

    async fn authorize(&self, _tool_name: &str, _user_id: &str) -> crate::error::Result<AuthStatus> {
        Ok(AuthStatus::Completed)
    }

    async fn wait_for_authorization(&self, _tool_name: &str, _user_id: &str) -> crate::error::Result<()> {
        Ok(())
    }

    async fn execute(
        &self,
        tool_name: &str,
        _input: serde_json::Value,
        _user_id: &str,
    ) -> crate::error::Result<ExecutionOutcome> {
        Err(crate::error::Error::Backend(format!(
            "no capability backend configured; cannot execute '{tool_name}'"
        )))
    }
}
