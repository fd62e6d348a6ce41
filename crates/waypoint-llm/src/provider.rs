//! The per-dialect provider trait and the provider identifier.

use crate::error::Result;
use crate::message::Message;
use crate::response::NormalizedResponse;
use crate::tools::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which model-provider dialect a task is configured to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Anthropic content-block dialect.
    Anthropic,
    /// OpenAI tool-call dialect.
    Openai,
}

impl ModelProvider {
    /// String form used in config parsing and CLI flags.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Openai => "openai",
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::Openai),
            other => Err(crate::error::Error::UnsupportedProvider(other.to_string())),
        }
    }
}

/// One model-provider dialect's implementation.
///
/// Implementors perform the actual network call and translate their wire
/// format into the shared [`NormalizedResponse`]; all dialect-specific
/// concerns (headers, block shapes, JSON-string-encoded arguments) stay
/// behind this trait.
#[async_trait]
pub trait Dialect: Send + Sync {
    /// Dialect identifier, for logging.
    fn provider(&self) -> ModelProvider;

    /// Model used when the caller does not override it.
    fn default_model(&self) -> &str;

    /// Perform one model call. `tools`, if empty, MUST be omitted from the
    /// wire request and the model MUST be invoked with no tool-choice
    /// coercion.
    async fn create_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        system_prompt: &str,
        model: Option<&str>,
    ) -> Result<NormalizedResponse>;
}
