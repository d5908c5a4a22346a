//! Derives replay frames from execution records.
//!
//! Classification is pure: the same record always yields the same frame, so
//! frames are rebuilt from the merged list on every change instead of being
//! patched in place.

mod classify;
mod model;
mod text;

pub use classify::{classify, classify_all, BROWSER_TOOL_PREFIX};
pub use model::{available_kinds, Frame, FrameCounts, FrameKind, ReplayFilter};
pub use text::{normalize_tool_name, pick_first_str, truncate_middle};
