use serde::{Deserialize, Serialize};

use crate::frame::ReplayFilter;

/// User intent, applied in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PlaybackCommand {
    TogglePlay,
    Play,
    Pause,
    Prev,
    Next,
    /// Index into the filtered list; clamped.
    Seek(usize),
    SeekLatest,
    SetFilter(ReplayFilter),
}

/// Observable snapshot of the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    pub selected_frame_id: Option<String>,
    pub selected_index: Option<usize>,
    pub frame_count: usize,
    pub is_playing: bool,
    pub is_live_follow: bool,
    /// Playing in realtime mode: hold at the end while the session runs.
    pub is_realtime: bool,
    pub filter: ReplayFilter,
    /// Fractional scrubber position; cosmetic only.
    pub interpolated_progress: f64,
}
