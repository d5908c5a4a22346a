use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One logged tool invocation.
///
/// `tool_output` doubles as the completion flag: the server fills it in place
/// once the tool returns, and from then on the record no longer changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,

    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub tool_name: String,

    #[serde(default)]
    pub tool_input: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<Value>,

    #[serde(default)]
    pub is_error: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

impl ExecutionRecord {
    pub fn new(id: impl Into<String>, created_at: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            updated_at: None,
            tool_name: tool_name.into(),
            tool_input: Value::Null,
            tool_output: None,
            is_error: false,
            duration_ms: None,
            tool_use_id: None,
            message_id: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.tool_output.is_some()
    }

    /// `is_error` only means something once the record is done.
    pub fn failed(&self) -> bool {
        self.is_done() && self.is_error
    }

    pub fn sort_key(&self) -> (&str, &str) {
        (self.created_at.as_str(), self.id.as_str())
    }

    /// Timestamp the delta endpoint filters on.
    pub fn sync_key(&self) -> &str {
        self.updated_at.as_deref().unwrap_or(&self.created_at)
    }

    /// Trimmed, non-empty string input parameter.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.tool_input
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Trimmed, non-empty correlation id for side artifacts.
    pub fn screenshot_key(&self) -> Option<&str> {
        self.tool_use_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn cmp_sort_key(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// `(created_at, id)` watermark of the last record observed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub after_created_at: String,
    pub after_id: String,
}

impl Cursor {
    pub fn new(after_created_at: impl Into<String>, after_id: impl Into<String>) -> Self {
        Self {
            after_created_at: after_created_at.into(),
            after_id: after_id.into(),
        }
    }

    pub fn of(record: &ExecutionRecord) -> Self {
        Self::new(record.created_at.as_str(), record.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_wire_shape_with_nulls() {
        let record: ExecutionRecord = serde_json::from_value(json!({
            "id": "7f0c",
            "message_id": 12,
            "tool_use_id": null,
            "tool_name": "Bash",
            "tool_input": {"command": "ls -la"},
            "tool_output": null,
            "is_error": false,
            "duration_ms": null,
            "created_at": "2026-03-01T10:00:00.000001",
            "updated_at": "2026-03-01T10:00:00.000001"
        }))
        .unwrap();

        assert!(!record.is_done());
        assert_eq!(record.input_str("command"), Some("ls -la"));
        assert_eq!(record.screenshot_key(), None);
        assert_eq!(record.message_id, Some(12));
    }

    #[test]
    fn error_flag_only_counts_once_done() {
        let mut record = ExecutionRecord::new("a", "t1", "Bash");
        record.is_error = true;
        assert!(!record.failed());
        record.tool_output = Some(json!({"stderr": "boom"}));
        assert!(record.failed());
    }

    #[test]
    fn cursor_is_creation_key_even_after_update() {
        let mut record = ExecutionRecord::new("a", "t1", "Bash");
        assert_eq!(Cursor::of(&record), Cursor::new("t1", "a"));
        record.updated_at = Some("t5".into());
        assert_eq!(Cursor::of(&record), Cursor::new("t1", "a"));
        assert_eq!(record.sync_key(), "t5");
    }

    #[test]
    fn blank_inputs_are_ignored() {
        let mut record = ExecutionRecord::new("a", "t1", "Read");
        record.tool_input = json!({"file_path": "   ", "path": 3});
        record.tool_use_id = Some("  ".into());
        assert_eq!(record.input_str("file_path"), None);
        assert_eq!(record.input_str("path"), None);
        assert_eq!(record.screenshot_key(), None);
    }
}
