//! Telemetry: the optional `initial_plan` / `final_result` Redis stream.
//!
//! The publisher is a side-effecting collaborator behind a trait so tests
//! can inject a null or in-memory sink (§9 "Telemetry decoupling"); the
//! entire surface is controlled by configuration and its failures are
//! always swallowed, never propagated into the task.

use crate::state::State;
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

/// One telemetry event name.
pub const EVENT_INITIAL_PLAN: &str = "initial_plan";
/// One telemetry event name.
pub const EVENT_FINAL_RESULT: &str = "final_result";

#[derive(Serialize)]
struct SanitizedState<'a> {
    input: &'a str,
    provider: &'static str,
    initial_plan: &'a [String],
    current_plan: &'a [String],
    past_steps: Vec<SanitizedStepOutcome<'a>>,
    past_results: Vec<SanitizedStepRawResult<'a>>,
    response: &'a str,
    status: Option<&'static str>,
    session_id: &'a str,
    user_id: &'a str,
    task_id: &'a str,
}

#[derive(Serialize)]
struct SanitizedStepOutcome<'a> {
    step: &'a str,
    summary: &'a str,
}

#[derive(Serialize)]
struct SanitizedStepRawResult<'a> {
    step: &'a str,
    final_text: &'a [String],
}

/// Build the sanitized, telemetry-safe JSON copy of `state`: `tool_results`
/// and `tools` are never present, per §6.
fn sanitize(state: &State) -> serde_json::Value {
    let sanitized = SanitizedState {
        input: &state.input,
        provider: state.provider.as_str(),
        initial_plan: &state.initial_plan,
        current_plan: &state.current_plan,
        past_steps: state
            .past_steps
            .iter()
            .map(|o| SanitizedStepOutcome {
                step: &o.step,
                summary: &o.summary,
            })
            .collect(),
        past_results: state
            .past_results
            .iter()
            .map(|r| SanitizedStepRawResult {
                step: &r.step,
                final_text: &r.final_text,
            })
            .collect(),
        response: &state.response,
        status: state.status.map(crate::state::TaskStatus::as_str),
        session_id: &state.session_id,
        user_id: &state.user_id,
        task_id: &state.task_id,
    };

    // Non-serializable values can't occur in this shape (everything above is
    // plain owned data), but a failure here still must not become a panic:
    // fall back to a stringified placeholder rather than unwrap.
    serde_json::to_value(&sanitized)
        .unwrap_or_else(|e| serde_json::json!({"serialization_error": e.to_string()}))
}

/// Sink for telemetry events.
#[async_trait]
pub trait TelemetryPublisher: Send + Sync {
    /// Publish one event. Implementations must swallow their own failures;
    /// telemetry is always best-effort.
    async fn publish(&self, event_type: &str, state: &State);
}

/// Publisher used when `publish_to_redis` is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetryPublisher;

#[async_trait]
impl TelemetryPublisher for NullTelemetryPublisher {
    async fn publish(&self, _event_type: &str, _state: &State) {}
}

/// Publishes events to a named Redis stream via `XADD`.
pub struct RedisTelemetryPublisher {
    client: redis::Client,
    stream_name: String,
}

impl RedisTelemetryPublisher {
    /// Build a publisher. Connection establishment is deferred to first
    /// publish so construction itself cannot fail the task.
    pub fn new(redis_url: &str, stream_name: impl Into<String>) -> crate::error::Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| crate::error::Error::Configuration(format!("invalid redis url: {e}")))?;
        Ok(Self {
            client,
            stream_name: stream_name.into(),
        })
    }

    async fn try_publish(&self, event_type: &str, state: &State) -> redis::RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let published_at = chrono::Utc::now().to_rfc3339();
        let data = sanitize(state);
        let payload = serde_json::json!({
            "event_type": event_type,
            "session_id": state.session_id,
            "user_id": state.user_id,
            "task_id": state.task_id,
            "data": data,
            "published_at": published_at,
        });

        redis::cmd("XADD")
            .arg(&self.stream_name)
            .arg("*")
            .arg("payload")
            .arg(payload.to_string())
            .query_async(&mut conn)
            .await
    }
}

#[async_trait]
impl TelemetryPublisher for RedisTelemetryPublisher {
    async fn publish(&self, event_type: &str, state: &State) {
        if let Err(e) = self.try_publish(event_type, state).await {
            warn!(event_type, error = %e, "telemetry publish failed, continuing");
        }
    }
}
