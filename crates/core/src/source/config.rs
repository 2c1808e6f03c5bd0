//! Source site configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the scraped source site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Token used when none can be scraped from the home page.
    #[serde(default = "default_fallback_token")]
    pub fallback_token: String,

    /// Per-candidate timeout for direct episode probes.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Timeout for show page scans.
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,

    /// Timeout for heavier pages (home page, show list, categories, details).
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Outbound request budget (0 = unlimited).
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Episode numbers above this are ignored when enumerating episode links.
    #[serde(default = "default_link_scan_ceiling")]
    pub link_scan_ceiling: u32,
}

fn default_base_url() -> String {
    "https://www.turkanime.co".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:140.0) Gecko/20100101 Firefox/140.0".to_string()
}

fn default_fallback_token() -> String {
    "3ced9ff5b1f02a1b475768c097dbee7f".to_string()
}

fn default_probe_timeout() -> u64 {
    8
}

fn default_scan_timeout() -> u64 {
    20
}

fn default_page_timeout() -> u64 {
    30
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_link_scan_ceiling() -> u32 {
    500
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            fallback_token: default_fallback_token(),
            probe_timeout_secs: default_probe_timeout(),
            scan_timeout_secs: default_scan_timeout(),
            page_timeout_secs: default_page_timeout(),
            requests_per_minute: default_requests_per_minute(),
            link_scan_ceiling: default_link_scan_ceiling(),
        }
    }
}

impl SourceConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    /// Site root with any trailing slash removed.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Registrable host of the site, e.g. `turkanime.co`.
    ///
    /// Show URLs must contain it to be tracked.
    pub fn site_domain(&self) -> String {
        reqwest::Url::parse(self.base())
            .ok()
            .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| self.base().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert_eq!(config.base_url, "https://www.turkanime.co");
        assert_eq!(config.probe_timeout(), Duration::from_secs(8));
        assert_eq!(config.scan_timeout(), Duration::from_secs(20));
        assert_eq!(config.requests_per_minute, 30);
        assert_eq!(config.link_scan_ceiling, 500);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            base_url = "https://mirror.turkanime.co/"
            probe_timeout_secs = 3
        "#;
        let config: SourceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base(), "https://mirror.turkanime.co");
        assert_eq!(config.probe_timeout_secs, 3);
        assert_eq!(config.scan_timeout_secs, 20);
    }

    #[test]
    fn test_site_domain() {
        assert_eq!(SourceConfig::default().site_domain(), "turkanime.co");
    }
}
