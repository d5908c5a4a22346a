use std::sync::Arc;
use std::time::Duration;

use super::cache::{ScreenshotCache, ScreenshotEntry};
use crate::config::ScreenshotConfig;
use crate::source::ExecutionLogSource;

/// Resolve one screenshot URL.
///
/// Not-found is retried after `retry_delay_ms`, at most `max_retries` times,
/// and only when `retry_on_404` is set; the capture lags the record by a
/// moment while a session runs. Every other failure resolves to `None`.
pub async fn fetch_with_retry(
    source: &dyn ExecutionLogSource,
    session_id: &str,
    tool_use_id: &str,
    retry_on_404: bool,
    config: &ScreenshotConfig,
) -> Option<String> {
    let delay = Duration::from_millis(config.retry_delay_ms);
    let mut retries = 0u32;

    loop {
        match source.screenshot(session_id, tool_use_id).await {
            Ok(found) => {
                tracing::debug!(
                    target: "execview.screenshot",
                    stage = "screenshot.resolved",
                    tool_use_id = %tool_use_id,
                    retries = retries
                );
                return Some(found.url);
            }
            Err(err) if err.is_not_found() && retry_on_404 && retries < config.max_retries => {
                retries += 1;
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                tracing::debug!(
                    target: "execview.screenshot",
                    stage = "screenshot.absent",
                    tool_use_id = %tool_use_id,
                    retries = retries,
                    kind = err.kind(),
                    error = %err
                );
                return None;
            }
        }
    }
}

/// Cache plus the source it fills from, for callers that await each fetch.
pub struct ScreenshotPrefetchCache {
    source: Arc<dyn ExecutionLogSource>,
    config: ScreenshotConfig,
    session_id: String,
    cache: ScreenshotCache,
}

impl ScreenshotPrefetchCache {
    pub fn new(
        source: Arc<dyn ExecutionLogSource>,
        session_id: impl Into<String>,
        config: ScreenshotConfig,
    ) -> Self {
        Self {
            source,
            config,
            session_id: session_id.into(),
            cache: ScreenshotCache::new(),
        }
    }

    pub fn cache(&self) -> &ScreenshotCache {
        &self.cache
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Point at another session; everything cached so far is dropped.
    pub fn switch_session(&mut self, session_id: impl Into<String>) {
        self.session_id = session_id.into();
        self.cache.reset();
    }

    /// Fetch unless the key is blank or already known, then return its entry.
    pub async fn fetch(&mut self, tool_use_id: &str, retry_on_404: bool) -> Option<&ScreenshotEntry> {
        if let Some(ticket) = self.cache.begin(tool_use_id) {
            let url = fetch_with_retry(
                self.source.as_ref(),
                &self.session_id,
                &ticket.tool_use_id,
                retry_on_404,
                &self.config,
            )
            .await;
            self.cache.resolve(&ticket, url);
        }
        self.cache.get(tool_use_id)
    }
}
