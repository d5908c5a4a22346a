use std::sync::Arc;

use super::driver::execute;
use super::plan::SyncRequest;
use super::state::{ApplyOutcome, ExecutionLogSync};
use crate::config::SyncConfig;
use crate::execution::ExecutionRecord;
use crate::source::ExecutionLogSource;

/// Sequential driver: plan, fetch and apply in one await.
///
/// Suits one-shot callers such as CLI listings. The replay runtime uses
/// [`ExecutionLogSync`] directly so fetches can overlap user input.
pub struct SyncClient {
    source: Arc<dyn ExecutionLogSource>,
    state: ExecutionLogSync,
}

impl SyncClient {
    pub fn new(source: Arc<dyn ExecutionLogSource>, config: SyncConfig) -> Self {
        Self {
            source,
            state: ExecutionLogSync::new(config),
        }
    }

    pub fn state(&self) -> &ExecutionLogSync {
        &self.state
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        self.state.records()
    }

    pub async fn reset(&mut self, session_id: &str) -> ApplyOutcome {
        let request = self.state.reset(session_id);
        self.run(request).await
    }

    pub async fn load_more(&mut self) -> Option<ApplyOutcome> {
        let request = self.state.load_more()?;
        Some(self.run(request).await)
    }

    pub async fn poll(&mut self) -> Option<ApplyOutcome> {
        let request = self.state.poll()?;
        Some(self.run(request).await)
    }

    pub async fn refetch(&mut self) -> Option<ApplyOutcome> {
        let request = self.state.refetch()?;
        Some(self.run(request).await)
    }

    /// Page through the whole history with `load_more` until a short page.
    pub async fn load_all(&mut self) -> usize {
        let mut pages = 0;
        while let Some(outcome) = self.load_more().await {
            pages += 1;
            if outcome == ApplyOutcome::Failed {
                break;
            }
        }
        pages
    }

    async fn run(&mut self, request: SyncRequest) -> ApplyOutcome {
        let response = execute(self.source.as_ref(), request).await;
        self.state.apply(response)
    }
}
