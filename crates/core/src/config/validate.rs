use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Scheduler interval and tick are positive
/// - At least one removal attempt is allowed
/// - The artifact directory is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Scheduler validation
    if config.scheduler.interval_minutes == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.interval_minutes must be positive".to_string(),
        ));
    }
    if config.scheduler.tick_ms == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.tick_ms cannot be 0".to_string(),
        ));
    }

    // Pipeline validation
    if config.pipeline.busy_retry_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.busy_retry_attempts must be at least 1".to_string(),
        ));
    }

    if config.source.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "source.dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_interval_fails() {
        let mut config = Config::default();
        config.scheduler.interval_minutes = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("interval_minutes"));
    }

    #[test]
    fn test_validate_zero_busy_attempts_fails() {
        let mut config = Config::default();
        config.pipeline.busy_retry_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_source_dir_fails() {
        let mut config = Config::default();
        config.source.dir = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }
}
