//! Provider-neutral conversation message types.

use crate::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// Role of a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions
    System,
    /// User-authored content
    User,
    /// Assistant-authored content
    Assistant,
    /// A tool's result, fed back to the model
    Tool,
}

impl MessageRole {
    /// String form used in logging and provider wire formats.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A single turn in a conversation.
///
/// This is the provider-neutral shape the rest of the system works with;
/// dialect translation happens only inside the provider implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this message
    pub role: MessageRole,
    /// Text content (may be empty for a pure tool_calls assistant turn)
    pub content: String,
    /// Present on `Tool` messages: which call this responds to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Present on some `Tool` messages: the tool name, for readability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Present on `Assistant` messages that requested tool use
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: Vec::new(),
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: Vec::new(),
        }
    }

    /// Build a plain assistant message (no tool calls).
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: Vec::new(),
        }
    }

    /// Build an assistant message that carries tool calls (openai-style append).
    #[must_use]
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls,
        }
    }

    /// Build a tool-result message keyed by `tool_call_id`.
    #[must_use]
    pub fn tool_response(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            name: None,
            tool_calls: Vec::new(),
        }
    }

    /// Build a tool-result message with the tool name attached (anthropic-style append
    /// appends a `user` role message with a `tool_result` content block instead; callers
    /// choose the role).
    #[must_use]
    pub fn tool_response_named(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Anthropic expects tool results appended as a `user` message whose content is a
    /// single `tool_result` block; this constructs that shape while keeping the role
    /// provider-neutral (`User`) as the spec's append rule requires.
    #[must_use]
    pub fn anthropic_tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
            name: None,
            tool_calls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_expected_roles() {
        assert_eq!(Message::system("x").role, MessageRole::System);
        assert_eq!(Message::user("x").role, MessageRole::User);
        assert_eq!(Message::assistant("x").role, MessageRole::Assistant);
        let tool = Message::tool_response("call_1", "ok");
        assert_eq!(tool.role, MessageRole::Tool);
        assert_eq!(tool.tool_call_id, Some("call_1".to_string()));
    }

    #[test]
    fn anthropic_tool_result_uses_user_role() {
        let msg = Message::anthropic_tool_result("toolu_1", "result text");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.tool_call_id, Some("toolu_1".to_string()));
    }
}
