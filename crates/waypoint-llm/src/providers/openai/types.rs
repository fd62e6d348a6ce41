//! Configuration for the openai tool-call dialect.

const DEFAULT_MODEL: &str = "gpt-4o";

/// Configuration for the openai dialect.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key used to authenticate with the chat completions endpoint.
    pub api_key: String,
    /// Optional base URL override, for openai-compatible gateways.
    pub base_url: Option<String>,
    /// Model used when the caller doesn't override it.
    pub default_model: String,
}

impl OpenAiConfig {
    /// Build a config from an explicit API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Build from `OPENAI_API_KEY`, with an optional `OPENAI_BASE_URL` override.
    pub fn from_env() -> crate::error::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            crate::error::Error::NotConfigured("OPENAI_API_KEY not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = Some(base_url);
        }
        Ok(config)
    }
}
