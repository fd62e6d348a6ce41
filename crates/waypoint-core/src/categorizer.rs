//! The Categorizer: final model call judging overall task outcome (§4.5 step 5).

use crate::state::{State, TaskStatus};
use waypoint_llm::{Message, ProviderAdapter, ToolDefinition, TraceContext};

const CATEGORIZE_TASK_RESULT: &str = "categorize_task_result";

const CATEGORIZER_SYSTEM_PROMPT: &str = "\
You are the final judge of a completed task. Given the objective and the \
full history of steps and their outcomes, decide whether the objective was \
met overall. Call categorize_task_result exactly once with your verdict \
and a short rationale.";

fn categorize_tool() -> ToolDefinition {
    ToolDefinition::new(
        CATEGORIZE_TASK_RESULT,
        "Record the final completed/failed verdict for this task.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "status": {"type": "string", "enum": ["completed", "failed"]},
                "rationale": {"type": "string"}
            },
            "required": ["status", "rationale"]
        }),
    )
}

fn past_steps_block(state: &State) -> String {
    if state.past_steps.is_empty() {
        return "(no steps were executed)".to_string();
    }
    state
        .past_steps
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {} -> {}", i + 1, o.step, o.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Judge the overall task outcome. Falls back to `Failed` (never panics,
/// never halts the task) when the model call itself errors or declines to
/// call the categorization tool.
pub async fn categorize(adapter: &ProviderAdapter, state: &State, ctx: &TraceContext) -> TaskStatus {
    let prompt = format!(
        "Objective: {}\n\nFinal response given to the user:\n{}\n\nStep history:\n{}",
        state.input,
        state.response,
        past_steps_block(state),
    );
    let messages = vec![Message::user(prompt)];
    let tools = vec![categorize_tool()];

    let response = match adapter
        .create_message(state.provider, &messages, &tools, CATEGORIZER_SYSTEM_PROMPT, ctx, None)
        .await
    {
        Ok(response) => response,
        Err(_) => return TaskStatus::Failed,
    };

    response
        .tool_calls
        .iter()
        .find(|c| c.name == CATEGORIZE_TASK_RESULT)
        .and_then(|c| c.arguments.get("status").and_then(|v| v.as_str()))
        .map(|status| if status == "completed" { TaskStatus::Completed } else { TaskStatus::Failed })
        .unwrap_or(TaskStatus::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use waypoint_llm::{Dialect, ModelProvider, NormalizedResponse, ToolCall, Usage};

    struct StubDialect {
        status: &'static str,
    }

    #[async_trait]
    impl Dialect for StubDialect {
        fn provider(&self) -> ModelProvider {
            ModelProvider::Anthropic
        }
        fn default_model(&self) -> &str {
            "stub"
        }
        async fn create_message(
            &self,
            _messages: &[Message],
            _tools: &[ToolDefinition],
            _system_prompt: &str,
            _model: Option<&str>,
        ) -> waypoint_llm::Result<NormalizedResponse> {
            Ok(NormalizedResponse {
                text_blocks: vec![],
                tool_calls: vec![ToolCall {
                    id: "call_1".to_string(),
                    name: CATEGORIZE_TASK_RESULT.to_string(),
                    arguments: serde_json::json!({"status": self.status, "rationale": "because"}),
                }],
                usage: Usage::default(),
            })
        }
    }

    #[tokio::test]
    async fn maps_completed_verdict() {
        let adapter = ProviderAdapter::new().with_anthropic(Arc::new(StubDialect { status: "completed" }));
        let state = State::new("x", ModelProvider::Anthropic, "u", "t", None);
        let status = categorize(&adapter, &state, &TraceContext::default()).await;
        assert_eq!(status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn maps_failed_verdict() {
        let adapter = ProviderAdapter::new().with_anthropic(Arc::new(StubDialect { status: "failed" }));
        let state = State::new("x", ModelProvider::Anthropic, "u", "t", None);
        let status = categorize(&adapter, &state, &TraceContext::default()).await;
        assert_eq!(status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn missing_dialect_falls_back_to_failed() {
        let adapter = ProviderAdapter::new();
        let state = State::new("x", ModelProvider::Anthropic, "u", "t", None);
        let status = categorize(&adapter, &state, &TraceContext::default()).await;
        assert_eq!(status, TaskStatus::Failed);
    }
}
