//! The Summarizer: judges one just-executed step's raw output (§4.5 step d).

use waypoint_llm::{Message, ProviderAdapter, TraceContext};

const SUMMARIZER_SYSTEM_PROMPT: &str = "\
You judge the outcome of one executed step. Decide whether it succeeded or \
failed, then produce at most two information-rich sentences beginning with \
exactly SUCCEEDED: or FAILED:. Be specific about what was accomplished or \
what went wrong; do not pad with filler.";

/// Summarize one step's raw text into a `SUCCEEDED:`/`FAILED:` verdict.
///
/// Falls back to a literal `FAILED: model call failed` verdict rather than
/// propagating the provider error -- a step's summary must always exist so
/// the Planner's step-tracking block has something to read.
pub async fn summarize(
    adapter: &ProviderAdapter,
    provider: waypoint_llm::ModelProvider,
    step: &str,
    final_text: &[String],
    ctx: &TraceContext,
) -> String {
    let prompt = format!(
        "Step: {step}\n\nRaw output produced while executing this step:\n{}",
        if final_text.is_empty() {
            "(no output produced)".to_string()
        } else {
            final_text.join("\n")
        }
    );
    let messages = vec![Message::user(prompt)];

    match adapter
        .create_message(provider, &messages, &[], SUMMARIZER_SYSTEM_PROMPT, ctx, None)
        .await
    {
        Ok(response) => {
            let text = response.text_blocks.join(" ").trim().to_string();
            if text.starts_with("SUCCEEDED") || text.starts_with("FAILED") {
                text
            } else if text.is_empty() {
                "FAILED: step produced no summary".to_string()
            } else {
                format!("FAILED: {text}")
            }
        }
        Err(e) => format!("FAILED: model call failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use waypoint_llm::{Dialect, ModelProvider, NormalizedResponse, ToolDefinition, Usage};

    struct StubDialect {
        text: &'static str,
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
                text_blocks: vec![self.text.to_string()],
                tool_calls: vec![],
                usage: Usage::default(),
            })
        }
    }

    #[tokio::test]
    async fn passes_through_a_well_formed_verdict() {
        let adapter = ProviderAdapter::new().with_anthropic(Arc::new(StubDialect {
            text: "SUCCEEDED: fetched 3 items.",
        }));
        let summary = summarize(
            &adapter,
            ModelProvider::Anthropic,
            "Fetch items",
            &["ok".to_string()],
            &TraceContext::default(),
        )
        .await;
        assert_eq!(summary, "SUCCEEDED: fetched 3 items.");
    }

    #[tokio::test]
    async fn wraps_malformed_prose_as_failed() {
        let adapter = ProviderAdapter::new().with_anthropic(Arc::new(StubDialect {
            text: "things seem fine I guess",
        }));
        let summary = summarize(
            &adapter,
            ModelProvider::Anthropic,
            "Fetch items",
            &[],
            &TraceContext::default(),
        )
        .await;
        assert!(summary.starts_with("FAILED"));
    }
}
