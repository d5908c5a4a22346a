use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default execview data directory: ~/.execview
pub fn get_execview_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".execview"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    Ok(toml::from_str::<AppConfig>(&s)?)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    load(None)
}

/// Load `explicit` if given, otherwise the first config found on the search
/// path, then apply environment overrides.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.execview/config.toml (highest)
    let data_dir = get_execview_data_dir()?;
    let home_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if let Some(path) = explicit {
        load_from_path(path)?
    } else if home_config.exists() {
        load_from_path(&home_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    // Log files go under the data directory unless configured otherwise
    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_deref()
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    {
        let logs_dir = data_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());

    Ok(cfg)
}

/// Environment variable overrides (Priority 0: highest).
pub(crate) fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("EXECVIEW_API_URL") {
        cfg.api.base_url = v;
    }
    if let Some(v) = non_empty("EXECVIEW_API_TOKEN") {
        cfg.api.api_token = v;
    }
    if let Some(v) = non_empty("EXECVIEW_POLL_INTERVAL_MS") {
        match v.trim().parse::<u64>() {
            Ok(ms) => cfg.sync.poll_interval_ms = ms,
            Err(_) => tracing::warn!(
                target: "execview.config",
                value = %v,
                "ignoring non-numeric EXECVIEW_POLL_INTERVAL_MS"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn load_from_path_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[screenshot]\nretry_delay_ms = 250\nlookahead = 1\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let cfg = load_from_path(file.path()).unwrap();
        assert_eq!(cfg.screenshot.retry_delay_ms, 250);
        assert_eq!(cfg.screenshot.lookahead, 1);
        assert_eq!(cfg.screenshot.max_retries, 10);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_from_path_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sync\npage_limit = ").unwrap();
        assert!(load_from_path(file.path()).is_err());
    }

    #[test]
    fn env_overrides_skip_blank_and_invalid_values() {
        let env: HashMap<&str, &str> = [
            ("EXECVIEW_API_URL", "https://api.example.com"),
            ("EXECVIEW_API_TOKEN", "   "),
            ("EXECVIEW_POLL_INTERVAL_MS", "soon"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.api.base_url, "https://api.example.com");
        assert_eq!(cfg.api.api_token, "");
        assert_eq!(cfg.sync.poll_interval_ms, 2_000);
    }

    #[test]
    fn env_overrides_poll_interval() {
        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| {
            (k == "EXECVIEW_POLL_INTERVAL_MS").then(|| "500".to_string())
        });
        assert_eq!(cfg.sync.poll_interval_ms, 500);
    }
}
