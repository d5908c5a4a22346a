use std::sync::Arc;

use thiserror::Error;

use crate::error::FetchError;
use crate::execution::Cursor;
use crate::frame::{Frame, FrameCounts};
use crate::playback::{PlaybackCommand, PlaybackState};

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCommand {
    /// Drop everything and start over on `session_id`.
    SwitchSession { session_id: String, active: bool },
    SetSessionActive(bool),
    LoadMore,
    Refetch,
    Playback(PlaybackCommand),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    RecordsChanged {
        session_id: String,
        count: usize,
        has_more: bool,
        cursor: Option<Cursor>,
    },
    /// Unfiltered frame list.
    FramesChanged {
        frames: Arc<Vec<Frame>>,
        counts: FrameCounts,
    },
    PlaybackChanged(PlaybackState),
    /// Interpolated scrubber position while playing.
    Progress(f64),
    ScreenshotResolved {
        tool_use_id: String,
        url: Option<String>,
    },
    SyncFailed {
        op: &'static str,
        error: FetchError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("replay runtime has shut down")]
    Closed,
}
