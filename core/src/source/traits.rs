use async_trait::async_trait;

use super::query::{DeltaPage, DeltaQuery, ScreenshotRef, SnapshotQuery};
use crate::error::FetchResult;
use crate::execution::ExecutionRecord;

/// Read side of the server-held execution log.
#[async_trait]
pub trait ExecutionLogSource: Send + Sync {
    fn name(&self) -> &str;

    async fn snapshot(&self, query: SnapshotQuery) -> FetchResult<Vec<ExecutionRecord>>;

    async fn delta(&self, query: DeltaQuery) -> FetchResult<DeltaPage>;

    /// Resolves the browser screenshot captured for `tool_use_id`.
    ///
    /// Not-found is expected for a short while after the record appears.
    async fn screenshot(&self, session_id: &str, tool_use_id: &str) -> FetchResult<ScreenshotRef>;
}
