//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `execview_core::api` instead of reaching into internal modules.

pub use crate::config::{
    get_execview_data_dir, load, load_default, load_from_path, ApiConfig, AppConfig, LoggingConfig,
    PlaybackConfig, ScreenshotConfig, SyncConfig,
};
pub use crate::context::{AppContext, SourceFactory};
pub use crate::error::{CliError, FetchError, FetchResult};
pub use crate::execution::{cursor_of, merge_into, Cursor, ExecutionRecord, MergeStats};
pub use crate::frame::{
    available_kinds, classify, classify_all, truncate_middle, Frame, FrameCounts, FrameKind,
    ReplayFilter,
};
pub use crate::playback::{PlaybackCommand, PlaybackController, PlaybackState};
pub use crate::runtime::{ReplayHandle, RuntimeCommand, RuntimeError, RuntimeEvent};
pub use crate::screenshot::{
    fetch_with_retry, prefetch_targets, ScreenshotCache, ScreenshotEntry, ScreenshotPrefetchCache,
};
pub use crate::source::{DeltaPage, DeltaQuery, ExecutionLogSource, ScreenshotRef, SnapshotQuery};
pub use crate::state::{SessionInfo, SessionStatus};
pub use crate::sync::{
    execute, ApplyOutcome, ExecutionLogSync, SyncClient, SyncRequest, SyncResponse,
    SyncStatusReport,
};
