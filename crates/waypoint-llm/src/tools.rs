//! Tool definitions and normalized tool calls.

use serde::{Deserialize, Serialize};

/// A tool offered to the model, in provider-neutral shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, unique within one request.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON schema for the tool's input object.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Build a tool definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Strategy for steering tool selection on a single call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to call a tool.
    #[default]
    Auto,
    /// Force a specific tool to be called.
    Tool(String),
}

/// A single tool invocation requested by the model, already normalized.
///
/// `arguments` is always a structured JSON value here, never a raw string:
/// the adapter decodes openai's JSON-encoded `arguments` string at the
/// protocol boundary so the rest of the system never parses JSON twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-generated unique id for this invocation.
    pub id: String,
    /// Tool name as requested by the model.
    pub name: String,
    /// Structured call arguments.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Re-encode `arguments` as a JSON string, for dialects (openai) that
    /// require the wire-format tool call to carry string-encoded arguments.
    #[must_use]
    pub fn arguments_json_string(&self) -> String {
        serde_json::to_string(&self.arguments).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definition_builder() {
        let def = ToolDefinition::new(
            "submit_plan",
            "Submit the ordered list of steps",
            serde_json::json!({"type": "object"}),
        );
        assert_eq!(def.name, "submit_plan");
    }

    #[test]
    fn arguments_round_trip_through_json_string() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "get_previous_step_result".into(),
            arguments: serde_json::json!({"step_number": 1}),
        };
        let encoded = call.arguments_json_string();
        let decoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, call.arguments);
    }
}
