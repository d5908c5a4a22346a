use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::runtime::ReplayHandle;
use crate::screenshot::ScreenshotPrefetchCache;
use crate::source::ExecutionLogSource;
use crate::sync::SyncClient;

/// Builds the log source for a config; implemented outside the core so the
/// transport stays pluggable.
pub trait SourceFactory: Send + Sync {
    fn build_source(&self, cfg: &AppConfig) -> Result<Arc<dyn ExecutionLogSource>, CliError>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    source: Arc<dyn ExecutionLogSource>,
}

impl AppContext {
    pub fn new(cfg: AppConfig, factory: &dyn SourceFactory) -> Result<Self, CliError> {
        let source = factory.build_source(&cfg)?;
        tracing::debug!(
            target: "execview.context",
            stage = "context.ready",
            source = source.name(),
            base_url = %cfg.api.base_url
        );
        Ok(Self { cfg, source })
    }

    pub fn with_source(cfg: AppConfig, source: Arc<dyn ExecutionLogSource>) -> Self {
        Self { cfg, source }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn source(&self) -> Arc<dyn ExecutionLogSource> {
        self.source.clone()
    }

    pub fn sync_client(&self) -> SyncClient {
        SyncClient::new(self.source.clone(), self.cfg.sync.clone())
    }

    pub fn screenshots(&self, session_id: &str) -> ScreenshotPrefetchCache {
        ScreenshotPrefetchCache::new(self.source.clone(), session_id, self.cfg.screenshot.clone())
    }

    /// Must be called inside a tokio runtime.
    pub fn spawn_replay(&self) -> ReplayHandle {
        ReplayHandle::spawn(self.source.clone(), &self.cfg)
    }
}
