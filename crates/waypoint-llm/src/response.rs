//! The normalized model response shared by every provider dialect.

use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Token accounting for one model call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Input (prompt) tokens billed.
    pub input: u32,
    /// Output (completion) tokens billed.
    pub output: u32,
    /// Tokens served from a provider-side prompt cache, if the dialect reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read_input: Option<u32>,
}

/// One call's normalized response.
///
/// `text_blocks` and `tool_calls` preserve the order in which they appeared
/// in the underlying provider payload; callers that need interleaved
/// presentation must not re-sort either vector.
#[derive(Debug, Clone, Default)]
pub struct NormalizedResponse {
    /// Ordered textual fragments (possibly empty).
    pub text_blocks: Vec<String>,
    /// Ordered tool invocations requested by the model (possibly empty).
    pub tool_calls: Vec<ToolCall>,
    /// Token usage for this call.
    pub usage: Usage,
}

impl NormalizedResponse {
    /// True when the model asked for at least one tool.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
