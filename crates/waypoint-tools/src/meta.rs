//! The three meta-tools: sentinel tool names handled inside the dispatcher
//! without ever touching the capability backend.
//!
//! These are modeled as plain functions over borrowed state rather than a
//! trait object precisely because they have no external effects -- keeping
//! them here (not in a routing table shared with external tools) is what
//! guarantees they never acquire an authorization step or a `tool_results`
//! entry by accident.

use std::collections::HashMap;
use waypoint_llm::ToolDefinition;

/// Return a previously recorded tool result verbatim.
pub const REFERENCE_TOOL_OUTPUT: &str = "reference_tool_output";
/// Look up a completed step's raw output by 1-based position.
pub const GET_PREVIOUS_STEP_RESULT: &str = "get_previous_step_result";
/// Declare the current step unworkable due to missing context.
pub const SIGNAL_INSUFFICIENT_CONTEXT: &str = "signal_insufficient_context";

/// `tool_id -> (tool_name, raw_result)`, the shape of `State::tool_results`.
pub type ToolResults = HashMap<String, (String, String)>;

/// `(step, final_text)` pairs, the shape of `State::past_results`.
pub type PastResults = [(String, Vec<String>)];

/// True when `name` is one of the three meta-tools.
#[must_use]
pub fn is_meta_tool(name: &str) -> bool {
    matches!(
        name,
        REFERENCE_TOOL_OUTPUT | GET_PREVIOUS_STEP_RESULT | SIGNAL_INSUFFICIENT_CONTEXT
    )
}

/// Tool definitions for the three meta-tools, always offered alongside the
/// external catalog.
#[must_use]
pub fn meta_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            REFERENCE_TOOL_OUTPUT,
            "Retrieve the stored raw result of a prior tool call by its tool_id.",
            serde_json::json!({
                "type": "object",
                "properties": {"tool_id": {"type": "string"}},
                "required": ["tool_id"]
            }),
        ),
        ToolDefinition::new(
            GET_PREVIOUS_STEP_RESULT,
            "Retrieve the raw textual output produced while executing an earlier, already-completed step.",
            serde_json::json!({
                "type": "object",
                "properties": {"step_number": {"type": "integer", "minimum": 1}},
                "required": ["step_number"]
            }),
        ),
        ToolDefinition::new(
            SIGNAL_INSUFFICIENT_CONTEXT,
            "Declare that the current step cannot proceed because required information is missing.",
            serde_json::json!({
                "type": "object",
                "properties": {"reason": {"type": "string"}},
                "required": ["reason"]
            }),
        ),
    ]
}

/// `reference_tool_output(tool_id)`.
#[must_use]
pub fn reference_tool_output(tool_id: &str, tool_results: &ToolResults) -> String {
    match tool_results.get(tool_id) {
        Some((_, raw)) => raw.clone(),
        None => format!("Error: No tool result found with ID '{tool_id}'"),
    }
}

/// `get_previous_step_result(step_number)`. `step_number` is 1-based.
#[must_use]
pub fn get_previous_step_result(step_number: i64, past_results: &PastResults) -> String {
    if step_number < 1 || step_number as usize > past_results.len() {
        return format!(
            "Error: step_number {step_number} is out of range (1..={})",
            past_results.len()
        );
    }
    let (step, raw) = &past_results[(step_number - 1) as usize];
    format!("Step {step_number} ({step}):\n{}", raw.join("\n"))
}

/// `signal_insufficient_context(reason)`.
#[must_use]
pub fn signal_insufficient_context(reason: &str) -> String {
    format!("STEP_FAILED_INSUFFICIENT_CONTEXT: {reason}")
}
