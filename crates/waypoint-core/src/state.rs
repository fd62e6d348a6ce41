//! The task-scoped `State` aggregate threaded through every component.

use uuid::Uuid;
use waypoint_llm::ModelProvider;
use waypoint_tools::{ToolCatalog, ToolResults};

/// One element of a [`Plan`]; an atomic unit of work for the Step Executor.
/// No identity beyond its position in the plan.
pub type Step = String;

/// An ordered list of steps. Two instances are tracked on `State`:
/// `initial_plan` (immutable once set) and `current_plan` (rewritten on
/// every replan).
pub type Plan = Vec<Step>;

/// `(step, summary)` where `summary` is a 1-2 sentence model-generated
/// judgement beginning with `SUCCEEDED` or `FAILED`.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// The step this outcome describes.
    pub step: Step,
    /// The Summarizer's verdict text.
    pub summary: String,
}

/// `(step, final_text)` where `final_text` is the ordered sequence of
/// textual fragments the Step Executor emitted while running that step.
#[derive(Debug, Clone)]
pub struct StepRawResult {
    /// The step this raw result is for.
    pub step: Step,
    /// Ordered textual fragments produced while executing the step.
    pub final_text: Vec<String>,
}

/// Final task status, set once at the very end of the Orchestrator loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The Categorizer judged the objective met.
    Completed,
    /// The Categorizer judged the objective unmet, or a forced terminal
    /// path (iteration cap, repeated failure) was taken.
    Failed,
}

impl TaskStatus {
    /// String form used in telemetry payloads and CLI exit reporting.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// The task-scoped aggregate. Created once by the Orchestrator at task
/// start, mutated in place by the Planner, Step Executor, Tool Dispatcher,
/// and Summarizer, and discarded on return.
///
/// Field mutation ownership (§9 "document which fields each component may
/// mutate"):
/// - `initial_plan`, `tools`: written once by `Planner::initial`, read-only
///   after.
/// - `current_plan`: rewritten wholesale by `Planner::replan`.
/// - `past_steps`, `past_results`: appended to by the Orchestrator after
///   each Step Executor / Summarizer call, never elsewhere.
/// - `tool_results`: written only by the Tool Dispatcher, for non-meta
///   calls.
/// - `response`, `status`: written once, at the very end.
pub struct State {
    /// The original user objective for this task.
    pub input: String,
    /// Which model-provider dialect this task is using.
    pub provider: ModelProvider,
    /// The plan produced by `Planner::initial`. Immutable once set.
    pub initial_plan: Plan,
    /// The plan currently being executed. Rewritten on every replan.
    pub current_plan: Plan,
    /// Append-only history of step outcomes.
    pub past_steps: Vec<StepOutcome>,
    /// Append-only history of step raw results, parallel index to
    /// `past_steps`.
    pub past_results: Vec<StepRawResult>,
    /// `tool_id -> (tool_name, raw_result)` for every non-meta tool call
    /// made this task.
    pub tool_results: ToolResults,
    /// The cached tool catalog for this task.
    pub tools: ToolCatalog,
    /// The final user-facing response. Empty until the task terminates.
    pub response: String,
    /// Set once, at the very end of the Orchestrator loop.
    pub status: Option<TaskStatus>,
    /// Tracing/telemetry correlation id.
    pub session_id: String,
    /// Acting user identifier.
    pub user_id: String,
    /// Task identifier.
    pub task_id: String,
}

impl State {
    /// Initialize a fresh State for one task invocation.
    #[must_use]
    pub fn new(
        input: impl Into<String>,
        provider: ModelProvider,
        user_id: impl Into<String>,
        task_id: impl Into<String>,
        session_id: Option<String>,
    ) -> Self {
        Self {
            input: input.into(),
            provider,
            initial_plan: Vec::new(),
            current_plan: Vec::new(),
            past_steps: Vec::new(),
            past_results: Vec::new(),
            tool_results: ToolResults::new(),
            tools: ToolCatalog::default(),
            response: String::new(),
            status: None,
            session_id: session_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: user_id.into(),
            task_id: task_id.into(),
        }
    }

    /// `past_results` as the borrowed tuple slice the meta-tools operate
    /// over.
    #[must_use]
    pub fn past_results_tuples(&self) -> Vec<(String, Vec<String>)> {
        self.past_results
            .iter()
            .map(|r| (r.step.clone(), r.final_text.clone()))
            .collect()
    }

    /// A Step is "final" iff it equals the last element of the most recent
    /// `current_plan` at the moment of its completion (§3 invariant).
    #[must_use]
    pub fn is_final_step(&self, step: &str) -> bool {
        self.current_plan.last().is_some_and(|last| last == step)
    }

    /// Validate the §3 invariants that must hold at every Orchestrator
    /// iteration boundary. Returns a [`crate::Error::StateViolation`]
    /// description on failure; callers treat this as fatal.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.past_steps.len() != self.past_results.len() {
            return Err(format!(
                "len(past_steps)={} != len(past_results)={}",
                self.past_steps.len(),
                self.past_results.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_generates_a_session_id_when_none_supplied() {
        let state = State::new("do things", ModelProvider::Anthropic, "user-1", "task-1", None);
        assert!(!state.session_id.is_empty());
    }

    #[test]
    fn is_final_step_checks_against_current_plan_tail() {
        let mut state = State::new("x", ModelProvider::Anthropic, "u", "t", None);
        state.current_plan = vec!["a".to_string(), "b".to_string()];
        assert!(!state.is_final_step("a"));
        assert!(state.is_final_step("b"));
    }

    #[test]
    fn check_invariants_flags_mismatched_lengths() {
        let mut state = State::new("x", ModelProvider::Anthropic, "u", "t", None);
        state.past_steps.push(StepOutcome {
            step: "a".to_string(),
            summary: "SUCCEEDED: did a".to_string(),
        });
        assert!(state.check_invariants().is_err());
    }
}
