//! The Provider Adapter: one `create_message` surface over both dialects.

use crate::error::{Error, Result};
use crate::message::Message;
use crate::provider::{Dialect, ModelProvider};
use crate::response::NormalizedResponse;
use crate::tools::ToolDefinition;
use crate::trace::{GenerationTrace, GenerationTracer, NullTracer, TraceContext};
use std::sync::Arc;

/// Normalizes anthropic and openai dialects behind one call and performs the
/// generation trace side effect described in the component design.
pub struct ProviderAdapter {
    anthropic: Option<Arc<dyn Dialect>>,
    openai: Option<Arc<dyn Dialect>>,
    tracer: Arc<dyn GenerationTracer>,
}

impl ProviderAdapter {
    /// Build an adapter with neither dialect configured; use `with_anthropic`/
    /// `with_openai` to enable the providers present in configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            anthropic: None,
            openai: None,
            tracer: Arc::new(NullTracer),
        }
    }

    /// Enable the anthropic dialect.
    #[must_use]
    pub fn with_anthropic(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.anthropic = Some(dialect);
        self
    }

    /// Enable the openai dialect.
    #[must_use]
    pub fn with_openai(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.openai = Some(dialect);
        self
    }

    /// Install a generation tracer. Defaults to a tracer that discards events.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Arc<dyn GenerationTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    fn dialect(&self, provider: ModelProvider) -> Result<&Arc<dyn Dialect>> {
        let configured = match provider {
            ModelProvider::Anthropic => &self.anthropic,
            ModelProvider::Openai => &self.openai,
        };
        configured
            .as_ref()
            .ok_or_else(|| Error::NotConfigured(format!("{} credentials not supplied", provider.as_str())))
    }

    /// Perform one model call, normalized to [`NormalizedResponse`].
    ///
    /// Emits a generation trace event when `ctx.session_id` is present;
    /// otherwise performs no tracing I/O.
    pub async fn create_message(
        &self,
        provider: ModelProvider,
        messages: &[Message],
        tools: &[ToolDefinition],
        system_prompt: &str,
        ctx: &TraceContext,
        model: Option<&str>,
    ) -> Result<NormalizedResponse> {
        let dialect = self.dialect(provider)?;
        let resolved_model = model
            .map(str::to_string)
            .unwrap_or_else(|| dialect.default_model().to_string());

        let response = dialect
            .create_message(messages, tools, system_prompt, Some(&resolved_model))
            .await?;

        if ctx.session_id.is_some() {
            self.tracer
                .record(GenerationTrace {
                    messages,
                    provider,
                    model: &resolved_model,
                    usage: &response.usage,
                    ctx,
                })
                .await;
        }

        Ok(response)
    }
}

impl Default for ProviderAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Usage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubDialect {
        provider: ModelProvider,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Dialect for StubDialect {
        fn provider(&self) -> ModelProvider {
            self.provider
        }

        fn default_model(&self) -> &str {
            "stub-model"
        }

        async fn create_message(
            &self,
            _messages: &[Message],
            _tools: &[ToolDefinition],
            _system_prompt: &str,
            _model: Option<&str>,
        ) -> Result<NormalizedResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(NormalizedResponse {
                text_blocks: vec!["hi".to_string()],
                tool_calls: vec![],
                usage: Usage::default(),
            })
        }
    }

    #[tokio::test]
    async fn missing_dialect_is_a_configuration_error() {
        let adapter = ProviderAdapter::new();
        let err = adapter
            .create_message(
                ModelProvider::Anthropic,
                &[],
                &[],
                "",
                &TraceContext::default(),
                None,
            )
            .await
            .unwrap_err();
        assert!(err.is_fatal_configuration());
    }

    #[tokio::test]
    async fn configured_dialect_is_invoked() {
        let dialect = Arc::new(StubDialect {
            provider: ModelProvider::Openai,
            calls: AtomicUsize::new(0),
        });
        let adapter = ProviderAdapter::new().with_openai(dialect.clone());
        let response = adapter
            .create_message(
                ModelProvider::Openai,
                &[Message::user("hi")],
                &[],
                "",
                &TraceContext::default(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(response.text_blocks, vec!["hi".to_string()]);
        assert_eq!(dialect.calls.load(Ordering::SeqCst), 1);
    }
}
