use crate::frame::{Frame, FrameKind};

/// Screenshot keys worth fetching for the current position.
///
/// The selected frame when it is a finished browser step, then finished
/// browser steps among the next `lookahead` frames of `frames`.
pub fn prefetch_targets(frames: &[Frame], selected: Option<usize>, lookahead: usize) -> Vec<String> {
    let Some(index) = selected.filter(|i| *i < frames.len()) else {
        return Vec::new();
    };
    let end = index.saturating_add(1).saturating_add(lookahead).min(frames.len());

    let mut targets: Vec<String> = Vec::new();
    for frame in &frames[index..end] {
        if frame.kind != FrameKind::Browser || !frame.is_done() {
            continue;
        }
        if let Some(key) = frame.execution.screenshot_key() {
            if !targets.iter().any(|t| t == key) {
                targets.push(key.to_string());
            }
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::ExecutionRecord;
    use crate::frame::classify;
    use serde_json::json;

    fn browser(id: &str, done: bool) -> Frame {
        let mut r = ExecutionRecord::new(id, format!("t-{id}"), "mcp____poco_playwright__browser_click");
        r.tool_use_id = Some(format!("tu-{id}"));
        if done {
            r.tool_output = Some(json!({"ok": true}));
        }
        classify(&r).unwrap()
    }

    fn terminal(id: &str) -> Frame {
        let mut r = ExecutionRecord::new(id, format!("t-{id}"), "bash");
        r.tool_output = Some(json!({}));
        classify(&r).unwrap()
    }

    #[test]
    fn selected_and_lookahead_done_browser_frames() {
        let frames = vec![
            browser("a", true),
            terminal("b"),
            browser("c", true),
            browser("d", true),
        ];
        assert_eq!(prefetch_targets(&frames, Some(0), 2), vec!["tu-a", "tu-c"]);
        assert_eq!(prefetch_targets(&frames, Some(1), 2), vec!["tu-c", "tu-d"]);
        assert_eq!(prefetch_targets(&frames, Some(3), 2), vec!["tu-d"]);
    }

    #[test]
    fn running_frames_and_missing_selection_are_skipped() {
        let frames = vec![browser("a", false), browser("b", false)];
        assert!(prefetch_targets(&frames, Some(0), 2).is_empty());
        assert!(prefetch_targets(&frames, None, 2).is_empty());
        assert!(prefetch_targets(&frames, Some(9), 2).is_empty());
    }

    #[test]
    fn huge_lookahead_is_clamped_to_list() {
        let frames = vec![browser("a", true), browser("b", true)];
        assert_eq!(prefetch_targets(&frames, Some(1), usize::MAX), vec!["tu-b"]);
    }
}
