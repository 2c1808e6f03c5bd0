//! Update checker configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the update checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Default for the `auto_refresh` setting.
    /// Manual checks through the API work either way.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Default for the `check_interval` setting (minutes between periodic checks).
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Pause between two checked shows in a batch (milliseconds).
    #[serde(default = "default_inter_show_delay")]
    pub inter_show_delay_ms: u64,

    /// Largest step past the current episode a page scan may report.
    #[serde(default = "default_max_episode_jump")]
    pub max_episode_jump: u32,

    /// Upper bound for scanned episode numbers when the total is unknown
    /// or smaller than this value.
    #[serde(default = "default_unknown_total_ceiling")]
    pub unknown_total_ceiling: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_minutes() -> u64 {
    30
}

fn default_inter_show_delay() -> u64 {
    1000
}

fn default_max_episode_jump() -> u32 {
    5
}

fn default_unknown_total_ceiling() -> u32 {
    100
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_minutes: default_interval_minutes(),
            inter_show_delay_ms: default_inter_show_delay(),
            max_episode_jump: default_max_episode_jump(),
            unknown_total_ceiling: default_unknown_total_ceiling(),
        }
    }
}

impl CheckerConfig {
    pub fn inter_show_delay(&self) -> Duration {
        Duration::from_millis(self.inter_show_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CheckerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval_minutes, 30);
        assert_eq!(config.inter_show_delay_ms, 1000);
        assert_eq!(config.max_episode_jump, 5);
        assert_eq!(config.unknown_total_ceiling, 100);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            enabled = false
            max_episode_jump = 3
        "#;
        let config: CheckerConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.max_episode_jump, 3);
        assert_eq!(config.interval_minutes, 30);
        assert_eq!(config.inter_show_delay(), Duration::from_millis(1000));
    }
}
