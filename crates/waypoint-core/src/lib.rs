//! waypoint-core - plan-execute-replan orchestrator, state model, and
//! telemetry glue.
//!
//! Wires together the Planner, Step Executor, Summarizer, and Categorizer
//! around a task-scoped [`state::State`], driven by the top-level
//! [`orchestrator::Orchestrator`] loop.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod categorizer;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod planner;
pub mod state;
pub mod step_executor;
pub mod summarizer;
pub mod telemetry;

pub use config::{OrchestratorConfig, ProviderCredentials};
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
pub use planner::{Planner, ReplanDecision};
pub use state::{Plan, State, Step, StepOutcome, StepRawResult, TaskStatus};
pub use telemetry::{NullTelemetryPublisher, RedisTelemetryPublisher, TelemetryPublisher};
