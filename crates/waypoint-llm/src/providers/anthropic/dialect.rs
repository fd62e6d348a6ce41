use super::convert::{convert_messages, convert_tool, convert_tool_choice};
use super::security::sanitize_api_error;
use super::types::{
    AnthropicConfig, AnthropicError, AnthropicRequest, AnthropicResponse, ResponseContentBlock,
    API_VERSION,
};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::provider::{Dialect, ModelProvider};
use crate::response::{NormalizedResponse, Usage};
use crate::tools::{ToolCall, ToolChoice, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

/// Anthropic content-block dialect.
pub struct AnthropicDialect {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicDialect {
    /// Build a dialect implementation from an explicit config.
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Build from `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| Error::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;
        Self::new(AnthropicConfig::new(api_key))
    }

    async fn send(&self, request: AnthropicRequest) -> Result<AnthropicResponse> {
        let url = format!("{}/v1/messages", self.config.base_url);
        debug!(url = %url, model = %request.model, "sending anthropic request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(Error::RateLimit);
            }
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                return Err(Error::Api(sanitize_api_error(&format!(
                    "{}: {}",
                    error.error.r#type, error.error.message
                ))));
            }
            return Err(Error::Api(sanitize_api_error(&format!(
                "HTTP {status}: {body}"
            ))));
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Dialect for AnthropicDialect {
    fn provider(&self) -> ModelProvider {
        ModelProvider::Anthropic
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
        let (extracted_system, anthropic_messages) = convert_messages(messages);
        let system = match (system_prompt.is_empty(), extracted_system) {
            (true, s) => s,
            (false, Some(s)) => Some(format!("{system_prompt}\n{s}")),
            (false, None) => Some(system_prompt.to_string()),
        };

        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (
                Some(tools.iter().map(convert_tool).collect()),
                convert_tool_choice(&ToolChoice::Auto),
            )
        };

        let request = AnthropicRequest {
            model,
            max_tokens: self.config.default_max_tokens,
            system,
            messages: anthropic_messages,
            temperature: None,
            tools,
            tool_choice,
        };

        let response = self.send(request).await?;

        // Walk content blocks once, in order, building both text_blocks and
        // tool_calls as we go -- this is what preserves the interleaving
        // contract; collapsing every text block into a single `Option<String>`
        // (as a naive per-block match would) would silently drop all but the
        // last text fragment.
        let mut text_blocks = Vec::new();
        let mut tool_calls = Vec::new();
        for block in response.content {
            match block {
                ResponseContentBlock::Text { text } => text_blocks.push(text),
                ResponseContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall {
                        id,
                        name,
                        arguments: input,
                    });
                }
            }
        }

        Ok(NormalizedResponse {
            text_blocks,
            tool_calls,
            usage: Usage {
                input: response.usage.input_tokens,
                output: response.usage.output_tokens,
                cache_read_input: response.usage.cache_read_input_tokens,
            },
        })
    }
}
