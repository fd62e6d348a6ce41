//! The Planner: two stateless, prompt-driven functions over `State`.

mod fallback;

use crate::state::{Plan, State};
use std::sync::Arc;
use waypoint_llm::{Message, ModelProvider, NormalizedResponse, ProviderAdapter, ToolDefinition, TraceContext};
use waypoint_tools::{CapabilityBackend, CatalogFormat, ToolCatalog};

const SUBMIT_PLAN: &str = "submit_plan";
const SUBMIT_FINAL_RESPONSE: &str = "submit_final_response";

const INITIAL_SYSTEM_PROMPT: &str = "\
You are the planning component of a task agent. Break the user's objective \
into a minimal, ordered list of actionable steps. Do not include \
irreversible write actions unless the user explicitly asked for them. The \
final step's result becomes the final answer. Call submit_plan with the \
ordered step list.";

const REPLAN_SYSTEM_PROMPT: &str = "\
You are the replanning component of a task agent. Given the objective, the \
current plan, and the steps completed so far, decide what remains. Produce \
only the remaining, not-yet-done steps. Only call submit_final_response \
when the last step of the current plan was the most recently completed \
step and the objective has been met. If a critical step has failed three \
times in a row, call submit_final_response acknowledging the failure.";

/// The outcome of `Planner::replan`.
#[derive(Debug, Clone)]
pub enum ReplanDecision {
    /// A revised, non-final plan to keep executing.
    Plan(Plan),
    /// The task is done (successfully or not); this is the user-facing
    /// response.
    FinalResponse(String),
}

fn submit_plan_tool() -> ToolDefinition {
    ToolDefinition::new(
        SUBMIT_PLAN,
        "Submit the ordered list of steps to execute.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "plan": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["plan"]
        }),
    )
}

fn submit_final_response_tool() -> ToolDefinition {
    ToolDefinition::new(
        SUBMIT_FINAL_RESPONSE,
        "Submit the final user-facing response and end the task.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "response": {"type": "string"}
            },
            "required": ["response"]
        }),
    )
}

fn extract_plan(response: &NormalizedResponse) -> Plan {
    if let Some(call) = response.tool_calls.iter().find(|c| c.name == SUBMIT_PLAN) {
        if let Some(steps) = call.arguments.get("plan").and_then(|v| v.as_array()) {
            let steps: Vec<String> = steps
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            if !steps.is_empty() {
                return steps;
            }
        }
    }
    fallback::parse_plan(&response.text_blocks.join("\n"))
}

fn tool_results_index(state: &State) -> String {
    if state.tool_results.is_empty() {
        return "(none yet)".to_string();
    }
    state
        .tool_results
        .iter()
        .map(|(id, (name, _))| format!("- {name} (id={id})"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn past_steps_block(state: &State) -> String {
    if state.past_steps.is_empty() {
        return "(none completed yet)".to_string();
    }
    state
        .past_steps
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {} -> {}", i + 1, o.step, o.summary))
        .collect::<Vec<_>>()
        .join("\n")
}

fn step_tracking_block(state: &State) -> String {
    let Some(planned) = state.current_plan.last() else {
        return "\u{2705} current plan is empty".to_string();
    };
    let Some(completed) = state.past_steps.last().map(|o| &o.step) else {
        return format!("\u{274c} no step completed yet; next planned step is {planned}");
    };
    if state.is_final_step(completed) {
        format!("\u{2705} last completed step matches last planned step ({planned})")
    } else {
        format!("\u{274c} last completed step ({completed}) does not match last planned step ({planned})")
    }
}

/// Stateless prompt-driven planner.
pub struct Planner {
    adapter: Arc<ProviderAdapter>,
}

impl Planner {
    /// Build a planner over a shared Provider Adapter.
    #[must_use]
    pub fn new(adapter: Arc<ProviderAdapter>) -> Self {
        Self { adapter }
    }

    /// Produce the initial plan and populate `state.tools` from the
    /// capability backend (first and only time it is fetched for this
    /// task).
    pub async fn initial(
        &self,
        state: &mut State,
        backend: &dyn CapabilityBackend,
        ctx: &TraceContext,
    ) -> Plan {
        let descriptors = backend
            .list_tools(CatalogFormat::Default)
            .await
            .unwrap_or_default();
        state.tools = ToolCatalog::new(descriptors);

        let tools = vec![submit_plan_tool()];
        let messages = vec![Message::user(format!("Objective: {}", state.input))];

        let response = self
            .adapter
            .create_message(state.provider, &messages, &tools, INITIAL_SYSTEM_PROMPT, ctx, None)
            .await;

        match response {
            Ok(response) => extract_plan(&response),
            Err(_) => vec!["Error: Could not generate plan".to_string()],
        }
    }

    /// Decide whether to keep planning or finish the task.
    pub async fn replan(&self, state: &State, ctx: &TraceContext) -> ReplanDecision {
        if state.current_plan.is_empty() {
            // Handled by the Orchestrator's own final-summary path normally,
            // but the Planner itself must also honor the "current_plan
            // empty -> must FinalResponse" row of the decision table if
            // ever called in that state.
            return ReplanDecision::FinalResponse(String::new());
        }

        let prompt = format!(
            "Objective: {}\n\nCurrent plan:\n{}\n\nSteps completed so far:\n{}\n\nStep tracking: {}\n\nRecorded tool results:\n{}",
            state.input,
            state.current_plan.join("\n"),
            past_steps_block(state),
            step_tracking_block(state),
            tool_results_index(state),
        );

        let tools = vec![submit_plan_tool(), submit_final_response_tool()];
        let messages = vec![Message::user(prompt)];

        let response = match self
            .adapter
            .create_message(state.provider, &messages, &tools, REPLAN_SYSTEM_PROMPT, ctx, None)
            .await
        {
            Ok(response) => response,
            Err(_) => return ReplanDecision::Plan(state.current_plan.clone()),
        };

        if let Some(call) = response
            .tool_calls
            .iter()
            .find(|c| c.name == SUBMIT_FINAL_RESPONSE)
        {
            let text = call
                .arguments
                .get("response")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            return ReplanDecision::FinalResponse(text);
        }

        if let Some(call) = response.tool_calls.iter().find(|c| c.name == SUBMIT_PLAN) {
            if let Some(steps) = call.arguments.get("plan").and_then(|v| v.as_array()) {
                let steps: Vec<String> = steps
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if !steps.is_empty() {
                    return ReplanDecision::Plan(steps);
                }
            }
        }

        let text = response.text_blocks.join("\n");
        if fallback::looks_like_final_response(&text) {
            return ReplanDecision::FinalResponse(text);
        }

        let reparsed = fallback::parse_plan(&text);
        if reparsed == vec!["Error: Could not generate plan".to_string()] {
            ReplanDecision::Plan(state.current_plan.clone())
        } else {
            ReplanDecision::Plan(reparsed)
        }
    }
}
