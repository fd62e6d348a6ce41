//! waypoint - plan-execute-replan task agent CLI.
//!
//! CLI entry point: takes an objective string, runs one task to completion,
//! and prints the final response.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint_core::{NullTelemetryPublisher, Orchestrator, OrchestratorConfig, RedisTelemetryPublisher, TelemetryPublisher};
use waypoint_llm::{providers::anthropic::AnthropicDialect, providers::openai::OpenAiDialect, ModelProvider, ProviderAdapter};
use waypoint_tools::NullCapabilityBackend;

/// waypoint - an autonomous plan-execute-replan task agent.
#[derive(Parser, Debug)]
#[command(name = "waypoint")]
#[command(about = "Plan-execute-replan task agent")]
#[command(version)]
struct Cli {
    /// Natural-language objective for the task.
    objective: String,

    /// Model provider dialect to use.
    #[arg(long, default_value = "anthropic")]
    provider: String,

    /// Acting user identifier, forwarded to the capability backend.
    #[arg(long, default_value = "local-user")]
    user_id: String,

    /// Task identifier, used for tracing and telemetry correlation.
    #[arg(long)]
    task_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypoint=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    let cli = Cli::parse();

    let provider: ModelProvider = cli
        .provider
        .parse()
        .map_err(|e: waypoint_llm::Error| anyhow::anyhow!("{e}"))
        .context("invalid --provider")?;

    let config = OrchestratorConfig::from_env().context("loading configuration")?;

    let mut adapter = ProviderAdapter::new();
    match AnthropicDialect::from_env() {
        Ok(dialect) => adapter = adapter.with_anthropic(Arc::new(dialect)),
        Err(e) if e.is_fatal_configuration() => info!("anthropic dialect not configured: {e}"),
        Err(e) => return Err(anyhow::anyhow!("building anthropic dialect: {e}")),
    }
    match OpenAiDialect::from_env() {
        Ok(dialect) => adapter = adapter.with_openai(Arc::new(dialect)),
        Err(e) if e.is_fatal_configuration() => info!("openai dialect not configured: {e}"),
        Err(e) => return Err(anyhow::anyhow!("building openai dialect: {e}")),
    }

    let telemetry: Arc<dyn TelemetryPublisher> = if config.publish_to_redis {
        Arc::new(
            RedisTelemetryPublisher::new(&config.redis_url, config.stream_name.clone())
                .context("building redis telemetry publisher")?,
        )
    } else {
        Arc::new(NullTelemetryPublisher)
    };

    // The capability (tool) backend is an out-of-scope collaborator
    // (individual tool semantics/credential handshake); wiring a real
    // backend against `config.tool_backend_key` is the embedding host's
    // responsibility, so the CLI runs with only the three meta-tools
    // available.
    let backend = Arc::new(NullCapabilityBackend);

    let orchestrator = Orchestrator::new(Arc::new(adapter), backend, telemetry, config);

    let task_id = cli.task_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    match orchestrator
        .run(cli.objective, provider, cli.user_id, task_id, None)
        .await
    {
        Ok((response, status)) => {
            println!("{response}");
            info!(status = status.as_str(), "task finished");
            Ok(())
        }
        Err(e) => {
            error!("task aborted: {e}");
            Err(anyhow::anyhow!(e))
        }
    }
}
