use super::convert::{convert_message, convert_tool, convert_tool_choice};
use super::types::OpenAiConfig;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::provider::{Dialect, ModelProvider};
use crate::response::{NormalizedResponse, Usage};
use crate::tools::{ToolCall, ToolChoice, ToolDefinition};
use async_openai::config::OpenAIConfig;
use async_openai::types::CreateChatCompletionRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use tracing::instrument;

/// OpenAI tool-call dialect.
pub struct OpenAiDialect {
    client: Client<OpenAIConfig>,
    config: OpenAiConfig,
}

impl OpenAiDialect {
    /// Build a dialect implementation from an explicit config.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        Self {
            client: Client::with_config(openai_config),
            config,
        }
    }

    /// Build from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(OpenAiConfig::from_env()?))
    }
}

#[async_trait]
impl Dialect for OpenAiDialect {
    fn provider(&self) -> ModelProvider {
        ModelProvider::Openai
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, messages, tools, system_prompt))]
    async fn create_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        system_prompt: &str,
        model: Option<&str>,
    ) -> Result<NormalizedResponse> {
        let model = model.unwrap_or(&self.config.default_model).to_string();

        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            wire_messages.push(convert_message(&Message::system(system_prompt)));
        }
        wire_messages.extend(messages.iter().map(convert_message));

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(model).messages(wire_messages);

        if !tools.is_empty() {
            request_builder
                .tools(tools.iter().map(convert_tool).collect::<Vec<_>>())
                .tool_choice(convert_tool_choice(&ToolChoice::Auto));
        }

        let request = request_builder
            .build()
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            let message = e.to_string();
            if message.contains("429") {
                Error::RateLimit
            } else {
                Error::Api(message)
            }
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("no choices in openai response".to_string()))?;

        // openai yields at most one text entry (the message content) followed
        // by its tool_calls; order between them is fixed by the dialect, not
        // by the wire payload, unlike anthropic's interleaved content blocks.
        let mut text_blocks = Vec::new();
        if let Some(content) = choice.message.content {
            if !content.is_empty() {
                text_blocks.push(content);
            }
        }

        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.into_iter().flatten() {
            let arguments: serde_json::Value = serde_json::from_str(&call.function.arguments)
                .map_err(|e| Error::InvalidResponse(format!("bad tool arguments json: {e}")))?;
            tool_calls.push(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            });
        }

        let usage = response.usage.map_or(Usage::default(), |u| Usage {
            input: u.prompt_tokens,
            output: u.completion_tokens,
            cache_read_input: None,
        });

        Ok(NormalizedResponse {
            text_blocks,
            tool_calls,
            usage,
        })
    }
}
