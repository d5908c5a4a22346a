use std::time::Duration;

use crate::config::PlaybackConfig;
use crate::frame::FrameKind;

/// How long a frame of `kind` stays on screen before auto-advance.
pub fn advance_delay(kind: FrameKind, config: &PlaybackConfig) -> Duration {
    let base = match kind {
        FrameKind::Browser => config.browser_delay_ms,
        FrameKind::Terminal => config.terminal_delay_ms,
        FrameKind::Tool => config.tool_delay_ms,
    };
    Duration::from_millis(base.max(config.min_delay_ms).max(1))
}

/// `index` plus the elapsed share of `delay`, clamped to one frame.
pub fn interpolate_progress(index: usize, elapsed: Duration, delay: Duration) -> f64 {
    if delay.is_zero() {
        return index as f64 + 1.0;
    }
    let ratio = (elapsed.as_secs_f64() / delay.as_secs_f64()).clamp(0.0, 1.0);
    index as f64 + ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_kind_defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(advance_delay(FrameKind::Browser, &config), Duration::from_millis(1200));
        assert_eq!(advance_delay(FrameKind::Tool, &config), Duration::from_millis(1500));
        assert_eq!(advance_delay(FrameKind::Terminal, &config), Duration::from_millis(1800));
    }

    #[test]
    fn delay_has_floor() {
        let config = PlaybackConfig {
            browser_delay_ms: 5,
            ..PlaybackConfig::default()
        };
        assert_eq!(advance_delay(FrameKind::Browser, &config), Duration::from_millis(80));
    }

    #[test]
    fn progress_is_clamped() {
        let delay = Duration::from_millis(1000);
        assert_eq!(interpolate_progress(2, Duration::ZERO, delay), 2.0);
        assert_eq!(interpolate_progress(2, Duration::from_millis(500), delay), 2.5);
        assert_eq!(interpolate_progress(2, Duration::from_secs(9), delay), 3.0);
    }
}
