//! Configuration for the database restorer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Firebird tool locations, target database and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestorerConfig {
    /// Path to the gbak binary.
    #[serde(default = "default_gbak_path")]
    pub gbak_path: PathBuf,

    /// Path to the gfix binary.
    #[serde(default = "default_gfix_path")]
    pub gfix_path: PathBuf,

    /// Working database replaced on every restore.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Wait between shutting the database down and bringing it back online.
    #[serde(default = "default_disconnect_settle_ms")]
    pub disconnect_settle_ms: u64,

    /// Timeout for a single tool invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_gbak_path() -> PathBuf {
    PathBuf::from("gbak")
}

fn default_gfix_path() -> PathBuf {
    PathBuf::from("gfix")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database/restored.fdb")
}

fn default_user() -> String {
    "SYSDBA".to_string()
}

fn default_password() -> String {
    "masterkey".to_string()
}

fn default_disconnect_settle_ms() -> u64 {
    2000
}

fn default_timeout() -> u64 {
    7200 // 2 hours
}

impl Default for RestorerConfig {
    fn default() -> Self {
        Self {
            gbak_path: default_gbak_path(),
            gfix_path: default_gfix_path(),
            database_path: default_database_path(),
            user: default_user(),
            password: default_password(),
            disconnect_settle_ms: default_disconnect_settle_ms(),
            timeout_secs: default_timeout(),
        }
    }
}
