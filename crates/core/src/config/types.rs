use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::notify::NotificationConfig;
use crate::reconcile::CheckerConfig;
use crate::source::SourceConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub checker: CheckerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("kanshi.db")
}

/// Sanitized config for API responses (fallback token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub source: SanitizedSourceConfig,
    pub checker: CheckerConfig,
    pub notifications: NotificationConfig,
}

/// Source settings without the fallback token
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSourceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub fallback_token_configured: bool,
    pub probe_timeout_secs: u64,
    pub scan_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub requests_per_minute: u32,
    pub link_scan_ceiling: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let source = &config.source;
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            source: SanitizedSourceConfig {
                base_url: source.base_url.clone(),
                user_agent: source.user_agent.clone(),
                fallback_token_configured: !source.fallback_token.is_empty(),
                probe_timeout_secs: source.probe_timeout_secs,
                scan_timeout_secs: source.scan_timeout_secs,
                page_timeout_secs: source.page_timeout_secs,
                requests_per_minute: source.requests_per_minute,
                link_scan_ceiling: source.link_scan_ceiling,
            },
            checker: config.checker.clone(),
            notifications: config.notifications.clone(),
        }
    }
}
