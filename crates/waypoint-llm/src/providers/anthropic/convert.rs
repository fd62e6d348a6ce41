//! Translation from the provider-neutral shapes to anthropic wire types.

use super::types::{AnthropicMessage, AnthropicTool, RequestContentBlock};
use crate::message::{Message, MessageRole};
use crate::tools::{ToolChoice, ToolDefinition};

/// Split a provider-neutral message list into an anthropic `system` string
/// plus the `messages` array, merging consecutive tool results and tool
/// calls into their carrier assistant/user turn as the dialect requires.
pub fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
    let mut system = None;
    let mut out = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                system = Some(match system.take() {
                    Some(existing) => format!("{existing}\n{}", msg.content),
                    None => msg.content.clone(),
                });
            }
            MessageRole::User => {
                let block = match &msg.tool_call_id {
                    Some(id) => RequestContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content: msg.content.clone(),
                    },
                    None => RequestContentBlock::Text {
                        text: msg.content.clone(),
                    },
                };
                out.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: vec![block],
                });
            }
            MessageRole::Assistant => {
                let mut content = Vec::new();
                if !msg.content.is_empty() {
                    content.push(RequestContentBlock::Text {
                        text: msg.content.clone(),
                    });
                }
                for call in &msg.tool_calls {
                    content.push(RequestContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.arguments.clone(),
                    });
                }
                out.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content,
                });
            }
            MessageRole::Tool => {
                let id = msg.tool_call_id.clone().unwrap_or_default();
                out.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: vec![RequestContentBlock::ToolResult {
                        tool_use_id: id,
                        content: msg.content.clone(),
                    }],
                });
            }
        }
    }

    (system, out)
}

pub fn convert_tool(def: &ToolDefinition) -> AnthropicTool {
    AnthropicTool {
        name: def.name.clone(),
        description: def.description.clone(),
        input_schema: def.parameters.clone(),
    }
}

pub fn convert_tool_choice(choice: &ToolChoice) -> Option<serde_json::Value> {
    match choice {
        ToolChoice::Auto => None,
        ToolChoice::Tool(name) => Some(serde_json::json!({"type": "tool", "name": name})),
    }
}
