//! Generation trace side effects.
//!
//! The Provider Adapter emits a trace event per model call when a session
//! identifier is present. The sink is a capability interface so tests can
//! inject an in-memory collector instead of touching real tracing I/O.

use crate::message::Message;
use crate::provider::ModelProvider;
use crate::response::Usage;
use async_trait::async_trait;

/// Identifiers threaded through a task, used to correlate trace events.
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    /// Session identifier, if tracing is enabled for this task.
    pub session_id: Option<String>,
    /// Acting user identifier.
    pub user_id: Option<String>,
    /// Task identifier.
    pub task_id: Option<String>,
}

/// One generation trace event.
#[derive(Debug, Clone)]
pub struct GenerationTrace<'a> {
    /// Messages sent to the model for this call.
    pub messages: &'a [Message],
    /// Dialect used.
    pub provider: ModelProvider,
    /// Model name actually used.
    pub model: &'a str,
    /// Usage reported by the provider.
    pub usage: &'a Usage,
    /// Correlation identifiers.
    pub ctx: &'a TraceContext,
}

/// Sink for generation trace events.
#[async_trait]
pub trait GenerationTracer: Send + Sync {
    /// Record one generation trace event. Implementations must not panic;
    /// tracing failures are never allowed to fail the model call.
    async fn record(&self, event: GenerationTrace<'_>);
}

/// Tracer that discards every event; used when no session id is present or
/// when the embedding host disables tracing entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracer;

#[async_trait]
impl GenerationTracer for NullTracer {
    async fn record(&self, _event: GenerationTrace<'_>) {}
}

/// Tracer that forwards events to `tracing` at debug level. This is the
/// default wired up by the CLI; a named stream publisher lives in
/// `waypoint-core`'s telemetry module and is driven independently at the
/// Orchestrator level (initial_plan/final_result events), not per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracer;

#[async_trait]
impl GenerationTracer for LogTracer {
    async fn record(&self, event: GenerationTrace<'_>) {
        tracing::debug!(
            provider = event.provider.as_str(),
            model = event.model,
            input_tokens = event.usage.input,
            output_tokens = event.usage.output,
            session_id = event.ctx.session_id.as_deref().unwrap_or(""),
            user_id = event.ctx.user_id.as_deref().unwrap_or(""),
            task_id = event.ctx.task_id.as_deref().unwrap_or(""),
            message_count = event.messages.len(),
            "generation trace"
        );
    }
}
