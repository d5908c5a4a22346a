use std::sync::Arc;

use anyhow::Result;

use execview_core::api::{AppConfig, CliError, ExecutionLogSource, SourceFactory};

use crate::source::HttpExecutionLogSource;

pub fn build_http_source(cfg: &AppConfig) -> Result<HttpExecutionLogSource> {
    HttpExecutionLogSource::new(
        &cfg.api.base_url,
        cfg.api.api_token.clone(),
        cfg.api.timeout_ms,
    )
}

pub fn build_source(cfg: &AppConfig) -> Result<Arc<dyn ExecutionLogSource>> {
    Ok(Arc::new(build_http_source(cfg)?))
}

/// Default factory handed to `AppContext`.
pub struct PluginSourceFactory;

impl SourceFactory for PluginSourceFactory {
    fn build_source(&self, cfg: &AppConfig) -> Result<Arc<dyn ExecutionLogSource>, CliError> {
        build_source(cfg).map_err(|e| CliError::Config(format!("api.base_url: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = "not a url".into();
        let err = PluginSourceFactory.build_source(&cfg).err().unwrap();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn builds_http_source_from_defaults() {
        let source = build_source(&AppConfig::default()).unwrap();
        assert_eq!(source.name(), "http");
    }
}
