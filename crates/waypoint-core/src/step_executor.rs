//! The Step Executor: the inner tool-calling loop for a single Step (§4.3).

use crate::state::State;
use std::sync::Arc;
use waypoint_llm::{Message, ProviderAdapter, TraceContext};
use waypoint_tools::ToolDispatcher;

/// Executor system prompt mandated by §4.3 step 1.
pub const EXECUTOR_SYSTEM_PROMPT: &str = "\
You are the execution component of a task agent, focused strictly on the \
current step. When you have finished the step, prepend RESULT: to your \
final summary sentence. Do not truncate or abbreviate when iterating over \
data. Never guess a missing identifier (email address, document id, \
channel name); if data required from an earlier step is missing, declare \
the step failed instead of guessing.";

fn tool_results_index(state: &State) -> String {
    if state.tool_results.is_empty() {
        return "(none recorded yet)".to_string();
    }
    state
        .tool_results
        .iter()
        .map(|(id, (name, raw))| format!("- {name} (id={id}, {} chars)", raw.len()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn past_steps_block(state: &State) -> String {
    if state.past_steps.is_empty() {
        return "(none completed yet)".to_string();
    }
    state
        .past_steps
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {} -> {}", i + 1, o.step, o.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

fn compose_user_prompt(state: &State, step: &str) -> String {
    format!(
        "Objective: {}\n\nCurrent plan:\n{}\n\nCompleted steps:\n{}\n\nRecorded tool results:\n{}\n\n\
Current step: {step}\n\nChecklist:\n- Use tools only as needed to complete this step.\n\
- If you need a prior step's raw output, call get_previous_step_result.\n\
- If you need a prior tool's raw output by id, call reference_tool_output.\n\
- If required information is missing, call signal_insufficient_context instead of guessing.\n\
- When done, prepend RESULT: to your final sentence.",
        state.input,
        state.current_plan.join("\n"),
        past_steps_block(state),
        tool_results_index(state),
    )
}

fn append_dispatch_messages(
    conversation: &mut Vec<Message>,
    provider: waypoint_llm::ModelProvider,
    assistant_content: String,
    call: waypoint_llm::ToolCall,
    tool_id: &str,
    result_text: &str,
) {
    conversation.push(Message::assistant_with_tool_calls(assistant_content, vec![call]));
    match provider {
        waypoint_llm::ModelProvider::Anthropic => {
            conversation.push(Message::anthropic_tool_result(tool_id, result_text));
        }
        waypoint_llm::ModelProvider::Openai => {
            conversation.push(Message::tool_response(tool_id, result_text));
        }
    }
}

/// Drive the inner loop for one Step, returning its ordered text fragments.
///
/// Mutates `state.tool_results` for any non-meta tool dispatched during the
/// step; never mutates `state.past_steps`/`state.past_results` (those are
/// the Orchestrator's responsibility, appended after this returns).
pub async fn execute(
    step: &str,
    state: &mut State,
    adapter: &ProviderAdapter,
    dispatcher: &ToolDispatcher,
    ctx: &TraceContext,
) -> Vec<String> {
    let mut final_text = Vec::new();
    let mut conversation = vec![Message::user(compose_user_prompt(state, step))];
    let tools = state.tools.to_llm_tools();

    loop {
        let response = match adapter
            .create_message(state.provider, &conversation, &tools, EXECUTOR_SYSTEM_PROMPT, ctx, None)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                final_text.push(format!("Error: model call failed: {e}"));
                break;
            }
        };

        for text in &response.text_blocks {
            final_text.push(text.clone());
        }

        let Some(call) = response.tool_calls.first().cloned() else {
            break;
        };

        let past_results_tuples = state.past_results_tuples();
        let outcome = dispatcher
            .dispatch(&call, &state.tool_results, &past_results_tuples, &state.user_id)
            .await;

        if let Some(record) = outcome.record.clone() {
            state.tool_results.insert(outcome.tool_id.clone(), record);
        }

        append_dispatch_messages(
            &mut conversation,
            state.provider,
            response.text_blocks.join("\n"),
            call,
            &outcome.tool_id,
            &outcome.result_text,
        );
    }

    final_text
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use waypoint_llm::{ModelProvider, NormalizedResponse, ToolDefinition, Usage};
    use waypoint_tools::{AuthStatus, CapabilityBackend, CatalogFormat, DispatchConfig, ExecutionOutcome, ToolDescriptor};

    struct ScriptedDialect {
        responses: std::sync::Mutex<Vec<NormalizedResponse>>,
        provider: ModelProvider,
    }

    #[async_trait]
    impl waypoint_llm::Dialect for ScriptedDialect {
        fn provider(&self) -> ModelProvider {
            self.provider
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
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    struct EmptyBackend;

    #[async_trait]
    impl CapabilityBackend for EmptyBackend {
        async fn list_tools(&self, _format: CatalogFormat) -> waypoint_tools::Result<Vec<ToolDescriptor>> {
            Ok(vec![])
        }
        async fn authorize(&self, _tool_name: &str, _user_id: &str) -> waypoint_tools::Result<AuthStatus> {
            Ok(AuthStatus::Completed)
        }
        async fn wait_for_authorization(&self, _tool_name: &str, _user_id: &str) -> waypoint_tools::Result<()> {
            Ok(())
        }
        async fn execute(
            &self,
            _tool_name: &str,
            _input: serde_json::Value,
            _user_id: &str,
        ) -> waypoint_tools::Result<ExecutionOutcome> {
            Ok(ExecutionOutcome {
                success: true,
                status: "ok".to_string(),
                output: None,
            })
        }
    }

    #[tokio::test]
    async fn terminates_when_model_emits_no_tool_calls() {
        let dialect = Arc::new(ScriptedDialect {
            responses: std::sync::Mutex::new(vec![NormalizedResponse {
                text_blocks: vec!["RESULT: done".to_string()],
                tool_calls: vec![],
                usage: Usage::default(),
            }]),
            provider: ModelProvider::Anthropic,
        });
        let adapter = ProviderAdapter::new().with_anthropic(dialect);
        let dispatcher = ToolDispatcher::new(Arc::new(EmptyBackend), DispatchConfig::default());
        let mut state = State::new("do a thing", ModelProvider::Anthropic, "u", "t", None);

        let final_text = execute(
            "Do the thing",
            &mut state,
            &adapter,
            &dispatcher,
            &TraceContext::default(),
        )
        .await;

        assert_eq!(final_text, vec!["RESULT: done".to_string()]);
    }

    #[tokio::test]
    async fn processes_only_the_first_tool_call_per_turn() {
        let dialect = Arc::new(ScriptedDialect {
            responses: std::sync::Mutex::new(vec![
                NormalizedResponse {
                    text_blocks: vec!["looking things up".to_string()],
                    tool_calls: vec![
                        waypoint_llm::ToolCall {
                            id: "call_1".to_string(),
                            name: "signal_insufficient_context".to_string(),
                            arguments: serde_json::json!({"reason": "no id"}),
                        },
                        waypoint_llm::ToolCall {
                            id: "call_2".to_string(),
                            name: "signal_insufficient_context".to_string(),
                            arguments: serde_json::json!({"reason": "ignored"}),
                        },
                    ],
                    usage: Usage::default(),
                },
                NormalizedResponse {
                    text_blocks: vec!["RESULT: failed, no id".to_string()],
                    tool_calls: vec![],
                    usage: Usage::default(),
                },
            ]),
            provider: ModelProvider::Openai,
        });
        let adapter = ProviderAdapter::new().with_openai(dialect);
        let dispatcher = ToolDispatcher::new(Arc::new(EmptyBackend), DispatchConfig::default());
        let mut state = State::new("reply to email", ModelProvider::Openai, "u", "t", None);

        let final_text = execute(
            "Reply to the important email",
            &mut state,
            &adapter,
            &dispatcher,
            &TraceContext::default(),
        )
        .await;

        assert_eq!(
            final_text,
            vec!["looking things up".to_string(), "RESULT: failed, no id".to_string()]
        );
        // signal_insufficient_context is a meta-tool; no tool_results entry.
        assert!(state.tool_results.is_empty());
    }
}
