use serde_json::Value;

use super::model::{Frame, FrameKind};
use super::text::{normalize_tool_name, pick_first_str, truncate_middle};
use crate::execution::ExecutionRecord;

/// Tool-name prefix of the sandbox's Playwright MCP server.
pub const BROWSER_TOOL_PREFIX: &str = "mcp____poco_playwright__";

const LABEL_MAX: usize = 80;
const UNKNOWN_COMMAND: &str = "unknown command";
const GENERIC_TOOLS: [&str; 5] = ["edit", "read", "write", "glob", "grep"];

/// Map a record onto a replay frame, or `None` for tools the replay does not
/// render.
pub fn classify(record: &ExecutionRecord) -> Option<Frame> {
    let normalized = normalize_tool_name(&record.tool_name);

    if normalized == "bash" {
        let label = record
            .tool_input
            .get("command")
            .and_then(Value::as_str)
            .filter(|cmd| !cmd.is_empty())
            .map(|cmd| truncate_middle(cmd, LABEL_MAX))
            .unwrap_or_else(|| UNKNOWN_COMMAND.to_string());
        return Some(frame(FrameKind::Terminal, record, label));
    }

    if let Some(raw) = record.tool_name.strip_prefix(BROWSER_TOOL_PREFIX) {
        let label = browser_label(raw.trim(), &record.tool_input);
        return Some(frame(FrameKind::Browser, record, label));
    }

    if GENERIC_TOOLS.contains(&normalized.as_str()) {
        let label = match tool_summary(&normalized, &record.tool_input) {
            Some(summary) => truncate_middle(summary, LABEL_MAX),
            None if record.tool_name.trim().is_empty() => "tool".to_string(),
            None => record.tool_name.trim().to_string(),
        };
        return Some(frame(FrameKind::Tool, record, label));
    }

    None
}

/// Classify every record, keeping order and skipping unrecognized tools.
pub fn classify_all(records: &[ExecutionRecord]) -> Vec<Frame> {
    records.iter().filter_map(classify).collect()
}

fn frame(kind: FrameKind, record: &ExecutionRecord, label: String) -> Frame {
    Frame {
        kind,
        execution: record.clone(),
        label,
    }
}

fn browser_label(raw: &str, input: &Value) -> String {
    let action = raw.strip_prefix("browser_").unwrap_or(raw);
    let summary = match action {
        "navigate" => pick_first_str(input, &["url", "href"]),
        "click" | "hover" => pick_first_str(input, &["selector", "text", "role", "name"]),
        "type" | "fill" | "press" => pick_first_str(input, &["selector", "role", "name", "text"])
            .or_else(|| pick_first_str(input, &["key", "value"])),
        _ => pick_first_str(
            input,
            &["url", "selector", "text", "role", "name", "value", "query", "path"],
        ),
    };
    match summary {
        Some(summary) => format!("{action} - {}", truncate_middle(summary, LABEL_MAX)),
        None => action.to_string(),
    }
}

fn tool_summary<'a>(normalized: &str, input: &'a Value) -> Option<&'a str> {
    match normalized {
        "edit" => pick_first_str(input, &["file_path", "path", "old_string", "new_string"]),
        "read" | "write" => pick_first_str(input, &["file_path", "path"]),
        "glob" => pick_first_str(input, &["pattern", "path"]),
        "grep" => pick_first_str(input, &["pattern", "path", "glob", "type"]),
        _ => None,
    }
}
