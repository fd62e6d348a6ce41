//! Recognized configuration options (§6).

use serde::Deserialize;
use std::time::Duration;

/// Provider credentials; presence of a key selects which providers are
/// available to a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderCredentials {
    /// `ANTHROPIC_API_KEY` equivalent.
    pub anthropic_key: Option<String>,
    /// `OPENAI_API_KEY` equivalent.
    pub openai_key: Option<String>,
}

/// Orchestrator-wide configuration, loaded once per process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Hard ceiling on (execute-step, replan) cycles per task.
    pub max_iterations: usize,
    /// Enable the `initial_plan` / `final_result` Redis stream telemetry.
    pub publish_to_redis: bool,
    /// Redis stream name telemetry events are published to.
    pub stream_name: String,
    /// Required for tool execution; opaque to this crate, forwarded to the
    /// capability backend collaborator.
    pub tool_backend_key: Option<String>,
    /// Restricts the tool catalog; empty means all known toolkits.
    pub enabled_toolkits: Vec<String>,
    /// If set, authorization never blocks; unfinished auth becomes a tool
    /// error instead of a wait.
    pub skip_cli_auth: bool,
    /// Deadline for a single tool HTTP call.
    #[serde(with = "duration_secs")]
    pub tool_call_deadline: Duration,
    /// Redis connection URL, used only when `publish_to_redis` is set.
    pub redis_url: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            publish_to_redis: false,
            stream_name: "plan_execution".to_string(),
            tool_backend_key: None,
            enabled_toolkits: Vec::new(),
            skip_cli_auth: false,
            tool_call_deadline: Duration::from_secs(25),
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from `WAYPOINT_*` environment variables, falling
    /// back to defaults for anything unset. A `.env` file, if present, is
    /// expected to have already been loaded by the caller (the CLI does
    /// this via `dotenvy` before constructing this config).
    pub fn from_env() -> crate::error::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(|e| {
                crate::error::Error::Configuration(format!("default config serialization: {e}"))
            })?)
            .add_source(config::Environment::with_prefix("WAYPOINT").separator("__"));

        builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| crate::error::Error::Configuration(e.to_string()))
    }

    /// Whether the Tool Dispatcher may block waiting for authorization.
    #[must_use]
    pub fn interactive_auth(&self) -> bool {
        !self.skip_cli_auth
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}
