use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::artifact::SourceConfig;
use crate::extractor::ExtractorConfig;
use crate::migration::MigrationConfig;
use crate::pipeline::PipelineConfig;
use crate::restorer::RestorerConfig;
use crate::scheduler::SchedulerConfig;
use crate::tracker::TrackerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub restorer: RestorerConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
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

// The control API has no authentication, so it only listens locally by default.
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub scheduler: SchedulerConfig,
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub tracker: TrackerConfig,
    pub extractor: ExtractorConfig,
    pub restorer: SanitizedRestorerConfig,
    pub migration: MigrationConfig,
}

/// Sanitized restorer config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRestorerConfig {
    pub gbak_path: PathBuf,
    pub gfix_path: PathBuf,
    pub database_path: PathBuf,
    pub user: String,
    pub password_configured: bool,
    pub disconnect_settle_ms: u64,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let restorer = &config.restorer;
        Self {
            server: config.server.clone(),
            scheduler: config.scheduler.clone(),
            pipeline: config.pipeline.clone(),
            source: config.source.clone(),
            tracker: config.tracker.clone(),
            extractor: config.extractor.clone(),
            restorer: SanitizedRestorerConfig {
                gbak_path: restorer.gbak_path.clone(),
                gfix_path: restorer.gfix_path.clone(),
                database_path: restorer.database_path.clone(),
                user: restorer.user.clone(),
                password_configured: !restorer.password.is_empty(),
                disconnect_settle_ms: restorer.disconnect_settle_ms,
                timeout_secs: restorer.timeout_secs,
            },
            migration: config.migration.clone(),
        }
    }
}
