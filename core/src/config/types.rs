use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub screenshot: ScreenshotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "execview_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin, without the `/api/v1` prefix.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Bearer token; empty disables the Authorization header.
    #[serde(default)]
    pub api_token: String,

    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_api_timeout_ms() -> u64 {
    60_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_token: String::new(),
            timeout_ms: default_api_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Delta poll cadence while the session is live.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Page size for both snapshot and delta queries.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Upper bound on delta pages drained in a single poll cycle.
    #[serde(default = "default_max_delta_pages")]
    pub max_delta_pages: usize,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_page_limit() -> usize {
    100
}

fn default_max_delta_pages() -> usize {
    5
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            page_limit: default_page_limit(),
            max_delta_pages: default_max_delta_pages(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Page size actually requested. Zero would make every empty page look
    /// full.
    pub fn page_limit(&self) -> usize {
        self.page_limit.max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_browser_delay_ms")]
    pub browser_delay_ms: u64,

    #[serde(default = "default_terminal_delay_ms")]
    pub terminal_delay_ms: u64,

    #[serde(default = "default_tool_delay_ms")]
    pub tool_delay_ms: u64,

    /// Floor applied to every per-kind delay.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Scrubber animation cadence while playing.
    #[serde(default = "default_animation_tick_ms")]
    pub animation_tick_ms: u64,
}

fn default_browser_delay_ms() -> u64 {
    1_200
}

fn default_terminal_delay_ms() -> u64 {
    1_800
}

fn default_tool_delay_ms() -> u64 {
    1_500
}

fn default_min_delay_ms() -> u64 {
    80
}

fn default_animation_tick_ms() -> u64 {
    16
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            browser_delay_ms: default_browser_delay_ms(),
            terminal_delay_ms: default_terminal_delay_ms(),
            tool_delay_ms: default_tool_delay_ms(),
            min_delay_ms: default_min_delay_ms(),
            animation_tick_ms: default_animation_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default = "default_screenshot_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Retries after the first not-found while the session is live.
    #[serde(default = "default_screenshot_max_retries")]
    pub max_retries: u32,

    /// Browser frames ahead of the selection to prefetch.
    #[serde(default = "default_screenshot_lookahead")]
    pub lookahead: usize,
}

fn default_screenshot_retry_delay_ms() -> u64 {
    800
}

fn default_screenshot_max_retries() -> u32 {
    10
}

fn default_screenshot_lookahead() -> usize {
    2
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_screenshot_retry_delay_ms(),
            max_retries: default_screenshot_max_retries(),
            lookahead: default_screenshot_lookahead(),
        }
    }
}
