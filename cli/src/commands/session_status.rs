use execview_core::api::{AppConfig, CliError, FetchError};
use execview_plugins::factory::build_http_source;
use execview_plugins::source::HttpExecutionLogSource;

/// Reads the server-side session status to decide live vs finished.
pub struct SessionStatusProbe {
    source: HttpExecutionLogSource,
}

impl SessionStatusProbe {
    pub fn new(cfg: &AppConfig) -> Result<Self, CliError> {
        let source = build_http_source(cfg).map_err(|e| CliError::Config(e.to_string()))?;
        Ok(Self { source })
    }

    pub async fn is_active(&self, session_id: &str) -> Result<bool, CliError> {
        let info = self
            .source
            .session_info(session_id)
            .await
            .map_err(|e| CliError::Fetch(FetchError::from(e)))?;
        tracing::debug!(
            target: "execview.cli",
            stage = "session.status",
            session_id = %session_id,
            status = %info.status
        );
        Ok(info.is_active())
    }
}
