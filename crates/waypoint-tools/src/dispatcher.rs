//! The Tool Dispatcher: routes one normalized tool call to either a
//! meta-tool or the capability backend, and never lets backend exceptions
//! propagate -- they become model-visible error strings instead.

use crate::backend::{AuthStatus, CapabilityBackend, ExecutionOutcome};
use crate::meta::{
    get_previous_step_result, is_meta_tool, reference_tool_output, signal_insufficient_context,
    PastResults, ToolResults, GET_PREVIOUS_STEP_RESULT, REFERENCE_TOOL_OUTPUT,
    SIGNAL_INSUFFICIENT_CONTEXT,
};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{instrument, warn};
use waypoint_llm::ToolCall;

/// Whether the dispatcher is allowed to block on a pending authorization.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Corresponds to configuration's `skip_cli_auth` negated: when `false`,
    /// a pending authorization is converted directly into a tool-result
    /// error instead of blocking.
    pub interactive_auth: bool,
    /// Upper bound on a single backend call (authorization or execution).
    /// Exceeding it surfaces as a tool-result error string, never a panic
    /// or process exit.
    pub tool_call_deadline: std::time::Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            interactive_auth: false,
            tool_call_deadline: std::time::Duration::from_secs(25),
        }
    }
}

/// Outcome of dispatching one tool call.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// The provider-generated id of the dispatched call.
    pub tool_id: String,
    /// The tool name that was dispatched.
    pub tool_name: String,
    /// Text to materialize back into the conversation as a tool result.
    pub result_text: String,
    /// `Some((tool_name, raw_result))` for external tools; `None` for
    /// meta-tools, which must never gain a `tool_results` entry.
    pub record: Option<(String, String)>,
}

/// Routes tool calls to meta-tool handlers or the capability backend.
pub struct ToolDispatcher {
    backend: Arc<dyn CapabilityBackend>,
    config: DispatchConfig,
}

impl ToolDispatcher {
    /// Build a dispatcher over a capability backend.
    #[must_use]
    pub fn new(backend: Arc<dyn CapabilityBackend>, config: DispatchConfig) -> Self {
        Self { backend, config }
    }

    /// Dispatch one tool call.
    #[instrument(skip(self, call, tool_results, past_results), fields(tool = %call.name))]
    pub async fn dispatch(
        &self,
        call: &ToolCall,
        tool_results: &ToolResults,
        past_results: &PastResults,
        user_id: &str,
    ) -> DispatchOutcome {
        if is_meta_tool(&call.name) {
            let result_text = self.dispatch_meta(call, tool_results, past_results);
            return DispatchOutcome {
                tool_id: call.id.clone(),
                tool_name: call.name.clone(),
                result_text,
                record: None,
            };
        }

        let result_text = self.dispatch_external(call, user_id).await;
        DispatchOutcome {
            record: Some((call.name.clone(), result_text.clone())),
            tool_id: call.id.clone(),
            tool_name: call.name.clone(),
            result_text,
        }
    }

    fn dispatch_meta(
        &self,
        call: &ToolCall,
        tool_results: &ToolResults,
        past_results: &PastResults,
    ) -> String {
        match call.name.as_str() {
            REFERENCE_TOOL_OUTPUT => match call.arguments.get("tool_id").and_then(|v| v.as_str()) {
                Some(tool_id) => reference_tool_output(tool_id, tool_results),
                None => "Error: missing required argument 'tool_id'".to_string(),
            },
            GET_PREVIOUS_STEP_RESULT => {
                match call.arguments.get("step_number").and_then(serde_json::Value::as_i64) {
                    Some(step_number) => get_previous_step_result(step_number, past_results),
                    None => "Error: missing required argument 'step_number'".to_string(),
                }
            }
            SIGNAL_INSUFFICIENT_CONTEXT => {
                match call.arguments.get("reason").and_then(|v| v.as_str()) {
                    Some(reason) => signal_insufficient_context(reason),
                    None => signal_insufficient_context("no reason given"),
                }
            }
            other => unreachable!("{other} is not a meta-tool"),
        }
    }

    async fn dispatch_external(&self, call: &ToolCall, user_id: &str) -> String {
        let deadline = self.config.tool_call_deadline;

        match timeout(deadline, self.backend.authorize(&call.name, user_id)).await {
            Ok(Ok(AuthStatus::Completed)) => {}
            Ok(Ok(AuthStatus::Pending { url })) => {
                if self.config.interactive_auth {
                    match timeout(
                        deadline,
                        self.backend.wait_for_authorization(&call.name, user_id),
                    )
                    .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            return format!("Error: authorization for '{}' did not complete: {e}", call.name);
                        }
                        Err(_) => {
                            return Self::deadline_error(&call.name, "authorization", deadline);
                        }
                    }
                } else {
                    return match url {
                        Some(url) => format!(
                            "Tool '{}' requires manual authorization. Visit: {url}",
                            call.name
                        ),
                        None => format!("Tool '{}' requires manual authorization.", call.name),
                    };
                }
            }
            Ok(Err(e)) => {
                warn!(tool = %call.name, error = %e, "authorization request failed");
                return format!("Error: authorization request failed: {e}");
            }
            Err(_) => return Self::deadline_error(&call.name, "authorization", deadline),
        }

        match timeout(
            deadline,
            self.backend.execute(&call.name, call.arguments.clone(), user_id),
        )
        .await
        {
            Ok(Ok(outcome)) => Self::render_outcome(&outcome),
            Ok(Err(e)) => {
                warn!(tool = %call.name, error = %e, "tool execution raised");
                format!("Error: {e}")
            }
            Err(_) => {
                warn!(tool = %call.name, deadline_secs = deadline.as_secs(), "tool call exceeded deadline");
                Self::deadline_error(&call.name, "execution", deadline)
            }
        }
    }

    fn deadline_error(tool_name: &str, phase: &str, deadline: std::time::Duration) -> String {
        format!(
            "Error: tool '{tool_name}' exceeded its {}s deadline during {phase}",
            deadline.as_secs()
        )
    }

    fn render_outcome(outcome: &ExecutionOutcome) -> String {
        if !outcome.success {
            return outcome.status.clone();
        }
        match &outcome.output {
            Some(output) if output.error.is_some() => {
                format!("Error: {}", output.error.as_deref().unwrap_or("unknown error"))
            }
            Some(output) => match &output.value {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => outcome.status.clone(),
            },
            None => outcome.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ToolOutput;
    use crate::catalog::{CatalogFormat, ToolDescriptor};
    use async_trait::async_trait;

    struct StubBackend {
        auth: AuthStatus,
        outcome: ExecutionOutcome,
    }

    #[async_trait]
    impl CapabilityBackend for StubBackend {
        async fn list_tools(&self, _format: CatalogFormat) -> crate::error::Result<Vec<ToolDescriptor>> {
            Ok(vec![])
        }

        async fn authorize(&self, _tool_name: &str, _user_id: &str) -> crate::error::Result<AuthStatus> {
            Ok(self.auth.clone())
        }

        async fn wait_for_authorization(&self, _tool_name: &str, _user_id: &str) -> crate::error::Result<()> {
            Ok(())
        }

        async fn execute(
            &self,
            _tool_name: &str,
            _input: serde_json::Value,
            _user_id: &str,
        ) -> crate::error::Result<ExecutionOutcome> {
            Ok(self.outcome.clone())
        }
    }

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: args,
        }
    }

    #[tokio::test]
    async fn meta_tool_never_produces_a_record() {
        let dispatcher = ToolDispatcher::new(
            Arc::new(StubBackend {
                auth: AuthStatus::Completed,
                outcome: ExecutionOutcome {
                    success: true,
                    status: "ok".to_string(),
                    output: None,
                },
            }),
            DispatchConfig::default(),
        );
        let tool_results = ToolResults::new();
        let past_results: Vec<(String, Vec<String>)> = vec![];
        let outcome = dispatcher
            .dispatch(
                &call(REFERENCE_TOOL_OUTPUT, serde_json::json!({"tool_id": "missing"})),
                &tool_results,
                &past_results,
                "user-1",
            )
            .await;
        assert!(outcome.record.is_none());
        assert!(outcome.result_text.starts_with("Error"));
    }

    #[tokio::test]
    async fn external_tool_success_records_and_returns_value() {
        let dispatcher = ToolDispatcher::new(
            Arc::new(StubBackend {
                auth: AuthStatus::Completed,
                outcome: ExecutionOutcome {
                    success: true,
                    status: "ok".to_string(),
                    output: Some(ToolOutput {
                        value: Some(serde_json::json!("42 results")),
                        error: None,
                    }),
                },
            }),
            DispatchConfig::default(),
        );
        let tool_results = ToolResults::new();
        let past_results: Vec<(String, Vec<String>)> = vec![];
        let outcome = dispatcher
            .dispatch(&call("web_search", serde_json::json!({"q": "rust"})), &tool_results, &past_results, "user-1")
            .await;
        assert_eq!(outcome.result_text, "42 results");
        assert_eq!(outcome.record, Some(("web_search".to_string(), "42 results".to_string())));
    }

    #[tokio::test]
    async fn non_interactive_pending_auth_is_a_manual_auth_string_not_a_block() {
        let dispatcher = ToolDispatcher::new(
            Arc::new(StubBackend {
                auth: AuthStatus::Pending {
                    url: Some("https://auth.example/complete".to_string()),
                },
                outcome: ExecutionOutcome {
                    success: true,
                    status: "ok".to_string(),
                    output: None,
                },
            }),
            DispatchConfig {
                interactive_auth: false,
                ..DispatchConfig::default()
            },
        );
        let tool_results = ToolResults::new();
        let past_results: Vec<(String, Vec<String>)> = vec![];
        let outcome = dispatcher
            .dispatch(&call("send_email", serde_json::json!({})), &tool_results, &past_results, "user-1")
            .await;
        assert!(outcome.result_text.contains("requires manual authorization"));
        assert!(outcome.record.is_some());
    }

    struct SlowBackend {
        delay: std::time::Duration,
    }

    #[async_trait]
    impl CapabilityBackend for SlowBackend {
        async fn list_tools(&self, _format: CatalogFormat) -> crate::error::Result<Vec<ToolDescriptor>> {
            Ok(vec![])
        }

        async fn authorize(&self, _tool_name: &str, _user_id: &str) -> crate::error::Result<AuthStatus> {
            Ok(AuthStatus::Completed)
        }

        async fn wait_for_authorization(&self, _tool_name: &str, _user_id: &str) -> crate::error::Result<()> {
            Ok(())
        }

        async fn execute(
            &self,
            _tool_name: &str,
            _input: serde_json::Value,
            _user_id: &str,
        ) -> crate::error::Result<ExecutionOutcome> {
            tokio::time::sleep(self.delay).await;
            Ok(ExecutionOutcome {
                success: true,
                status: "ok".to_string(),
                output: None,
            })
        }
    }

    #[tokio::test]
    async fn execute_exceeding_the_deadline_becomes_an_error_string() {
        let dispatcher = ToolDispatcher::new(
            Arc::new(SlowBackend {
                delay: std::time::Duration::from_millis(50),
            }),
            DispatchConfig {
                tool_call_deadline: std::time::Duration::from_millis(5),
                ..DispatchConfig::default()
            },
        );
        let tool_results = ToolResults::new();
        let past_results: Vec<(String, Vec<String>)> = vec![];
        let outcome = dispatcher
            .dispatch(&call("slow_tool", serde_json::json!({})), &tool_results, &past_results, "user-1")
            .await;
        assert!(outcome.result_text.contains("exceeded its"));
        assert!(outcome.result_text.contains("deadline"));
    }
}
