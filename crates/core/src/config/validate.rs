use super::{Config, ConfigError};

/// Validate configuration values that serde cannot express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Source validation
    let source = &config.source;
    if !source.base_url.starts_with("http://") && !source.base_url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "source.base_url must be an http(s) URL, got '{}'",
            source.base_url
        )));
    }
    if source.probe_timeout_secs == 0
        || source.scan_timeout_secs == 0
        || source.page_timeout_secs == 0
    {
        return Err(ConfigError::ValidationError(
            "source timeouts must be greater than 0".to_string(),
        ));
    }

    // Checker validation
    let checker = &config.checker;
    if checker.enabled && checker.interval_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "checker.interval_minutes cannot be 0 when the checker is enabled".to_string(),
        ));
    }
    if checker.max_episode_jump == 0 {
        return Err(ConfigError::ValidationError(
            "checker.max_episode_jump must be at least 1".to_string(),
        ));
    }

    Ok(())
}
