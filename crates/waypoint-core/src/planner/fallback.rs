//! The planner-output fallback parser chain (§4.4, §9).
//!
//! Each strategy either returns a non-empty list or defers to the next.
//! This chain only runs when the model failed to call `submit_plan`/
//! `submit_final_response` and fell back to prose.

use crate::state::Plan;
use regex::Regex;

const PARSE_ERROR: &str = "Error: Could not generate plan";

/// Try, in order: JSON array, JSON object with `steps`, markdown bullet
/// list, numbered list, non-empty line split. Returns the constant error
/// plan if every strategy defers.
#[must_use]
pub fn parse_plan(text: &str) -> Plan {
    json_array(text)
        .or_else(|| json_object_steps(text))
        .or_else(|| bullet_list(text))
        .or_else(|| numbered_list(text))
        .or_else(|| line_split(text))
        .unwrap_or_else(|| vec![PARSE_ERROR.to_string()])
}

fn strings_from(values: &[serde_json::Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn json_array(text: &str) -> Option<Plan> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let arr = value.as_array()?;
    let steps = strings_from(arr);
    (!steps.is_empty()).then_some(steps)
}

fn json_object_steps(text: &str) -> Option<Plan> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let arr = value.get("steps")?.as_array()?;
    let steps = strings_from(arr);
    (!steps.is_empty()).then_some(steps)
}

fn bullet_list(text: &str) -> Option<Plan> {
    let steps: Vec<String> = text
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            ["- ", "* ", "\u{2022} "]
                .iter()
                .find_map(|prefix| trimmed.strip_prefix(prefix))
                .map(|rest| rest.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .collect();
    (!steps.is_empty()).then_some(steps)
}

fn numbered_list(text: &str) -> Option<Plan> {
    let re = Regex::new(r"^\d+[\.\)]\s*(.+)$").expect("static numbered-list regex is valid");
    let steps: Vec<String> = text
        .lines()
        .filter_map(|line| re.captures(line.trim()).map(|c| c[1].trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect();
    (!steps.is_empty()).then_some(steps)
}

fn line_split(text: &str) -> Option<Plan> {
    let steps: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    (!steps.is_empty()).then_some(steps)
}

/// Whether `text` reads as a final-response declaration, per the replan
/// fallback rule (§4.4): "if the model returns prose containing 'objective
/// has been achieved' or 'final response', treat it as a final response".
#[must_use]
pub fn looks_like_final_response(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("objective has been achieved") || lower.contains("final response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array() {
        let plan = parse_plan(r#"["Fetch items", "Summarize items"]"#);
        assert_eq!(plan, vec!["Fetch items", "Summarize items"]);
    }

    #[test]
    fn parses_json_object_with_steps() {
        let plan = parse_plan(r#"{"steps": ["One", "Two"]}"#);
        assert_eq!(plan, vec!["One", "Two"]);
    }

    #[test]
    fn parses_bullet_list() {
        let plan = parse_plan("- Fetch items\n- Summarize items\n");
        assert_eq!(plan, vec!["Fetch items", "Summarize items"]);
    }

    #[test]
    fn parses_numbered_list() {
        let plan = parse_plan("1. Fetch items\n2) Summarize items\n");
        assert_eq!(plan, vec!["Fetch items", "Summarize items"]);
    }

    #[test]
    fn falls_back_to_line_split() {
        let plan = parse_plan("Fetch items\nSummarize items");
        assert_eq!(plan, vec!["Fetch items", "Summarize items"]);
    }

    #[test]
    fn returns_constant_error_when_nothing_parses() {
        let plan = parse_plan("   \n  \n");
        assert_eq!(plan, vec![PARSE_ERROR.to_string()]);
    }

    #[test]
    fn detects_final_response_phrasing() {
        assert!(looks_like_final_response("The objective has been achieved."));
        assert!(looks_like_final_response("Here is my Final Response: done."));
        assert!(!looks_like_final_response("Step 1: do the thing"));
    }
}
