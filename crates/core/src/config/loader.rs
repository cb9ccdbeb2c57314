use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `RESTOREKEEPER_SCHEDULER__INTERVAL_MINUTES`.
pub const ENV_PREFIX: &str = "RESTOREKEEPER_";

/// Variable that sets the initial interval, kept from earlier deployments.
pub const LEGACY_INTERVAL_VAR: &str = "SCHEDULER_INTERVAL";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Layers, lowest priority first: defaults, file, legacy variable, prefixed
/// variables, then the saved interval if `scheduler.interval_file` names one.
fn extract(base: Figment) -> Result<Config, ConfigError> {
    let figment = base
        .merge(
            Env::raw()
                .only(&[LEGACY_INTERVAL_VAR])
                .map(|_| "scheduler.interval_minutes".into()),
        )
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    // A missing file is an empty layer: nothing was changed at runtime yet.
    match config.scheduler.interval_file.clone() {
        Some(path) => figment
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string())),
        None => Ok(config),
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[pipeline]
busy_retry_attempts = 5
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.pipeline.busy_retry_attempts, 5);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[scheduler]
interval_minutes = "hourly"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "0.0.0.0"
port = 3000

[tracker]
path = "/var/lib/restorekeeper/last_processed.txt"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(
            config.tracker.path.to_str().unwrap(),
            "/var/lib/restorekeeper/last_processed.txt"
        );
    }

    #[tokio::test]
    async fn test_saved_interval_wins_after_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let interval_file = dir.path().join("interval.toml");
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "[scheduler]\ninterval_minutes = 60\ninterval_file = '{}'\n",
                interval_file.display()
            ),
        )
        .unwrap();

        // Nothing saved yet
        let config = load_config(&config_path).unwrap();
        assert!(!interval_file.exists());

        let scheduler = crate::Scheduler::new(
            config.scheduler.clone(),
            std::sync::Arc::new(crate::testing::MockPipeline::new()),
        );
        scheduler.set_interval(240).await.unwrap();

        let reloaded = load_config(&config_path).unwrap();
        assert_eq!(reloaded.scheduler.interval_minutes, 240);
        assert_eq!(reloaded.scheduler.interval_file, Some(interval_file));
    }

    #[tokio::test]
    async fn test_rejected_interval_is_not_saved() {
        let dir = tempfile::TempDir::new().unwrap();
        let interval_file = dir.path().join("interval.toml");
        let scheduler = crate::Scheduler::new(
            crate::SchedulerConfig::default().with_interval_file(&interval_file),
            std::sync::Arc::new(crate::testing::MockPipeline::new()),
        );

        assert!(scheduler.set_interval(0).await.is_err());
        assert!(!interval_file.exists());
    }

    #[test]
    fn test_env_overrides() {
        // The only test in this crate that touches these variables.
        std::env::set_var(LEGACY_INTERVAL_VAR, "30");
        std::env::set_var("RESTOREKEEPER_SCHEDULER__ERROR_BACKOFF_SECS", "5");
        let config = load_config_from_env();
        std::env::remove_var(LEGACY_INTERVAL_VAR);
        std::env::remove_var("RESTOREKEEPER_SCHEDULER__ERROR_BACKOFF_SECS");

        let config = config.unwrap();
        assert_eq!(config.scheduler.interval_minutes, 30);
        assert_eq!(config.scheduler.error_backoff_secs, 5);
    }
}
