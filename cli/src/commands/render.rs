use execview_core::api::{ExecutionRecord, Frame, PlaybackState};
use serde_json::{json, Value};

fn status_tag(record: &ExecutionRecord) -> &'static str {
    if !record.is_done() {
        "running"
    } else if record.is_error {
        "error"
    } else {
        "done"
    }
}

pub fn frame_line(index: usize, frame: &Frame) -> String {
    let mut line = format!(
        "#{:<4} {:<8} {:<7} {}",
        index,
        frame.kind.as_str(),
        status_tag(&frame.execution),
        frame.label
    );
    if let Some(ms) = frame.execution.duration_ms {
        line.push_str(&format!("  ({ms}ms)"));
    }
    line
}

pub fn frame_json(index: usize, frame: &Frame) -> Value {
    json!({
        "index": index,
        "id": frame.id(),
        "kind": frame.kind,
        "status": status_tag(&frame.execution),
        "label": frame.label,
        "tool_name": frame.execution.tool_name,
        "tool_use_id": frame.execution.tool_use_id,
        "created_at": frame.execution.created_at,
        "duration_ms": frame.execution.duration_ms,
    })
}

pub fn record_line(record: &ExecutionRecord) -> String {
    format!(
        "-     {:<8} {:<7} {}",
        "other",
        status_tag(record),
        record.tool_name
    )
}

pub fn playback_line(state: &PlaybackState) -> String {
    let position = match state.selected_index {
        Some(i) => format!("{}/{}", i + 1, state.frame_count),
        None => format!("-/{}", state.frame_count),
    };
    let mode = if state.is_playing {
        "playing"
    } else {
        "paused"
    };
    let follow = if state.is_live_follow { " live" } else { "" };
    format!("[{mode}{follow}] {position} filter={}", state.filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use execview_core::api::{classify, ReplayFilter};
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_frame_line() {
        let mut record = ExecutionRecord::new("a", "t1", "Bash");
        record.tool_input = json!({"command": "cargo fmt"});
        record.tool_output = Some(json!({}));
        record.duration_ms = Some(42);
        let frame = classify(&record).unwrap();
        assert_eq!(frame_line(3, &frame), "#3    terminal done    cargo fmt  (42ms)");
        assert_eq!(frame_json(3, &frame)["kind"], "terminal");
    }

    #[test]
    fn formats_playback_line() {
        let state = PlaybackState {
            selected_frame_id: Some("b".into()),
            selected_index: Some(1),
            frame_count: 4,
            is_playing: true,
            is_live_follow: false,
            is_realtime: true,
            filter: ReplayFilter::All,
            interpolated_progress: 1.5,
        };
        assert_eq!(playback_line(&state), "[playing] 2/4 filter=all");
    }
}
