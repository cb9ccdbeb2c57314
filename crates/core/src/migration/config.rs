//! Configuration for the migration runner.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command used to migrate data out of the restored database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Program to run, e.g. `npm`.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Arguments for the migration itself.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Arguments for installing dependencies. Empty skips the step.
    #[serde(default = "default_setup_args")]
    pub setup_args: Vec<String>,

    /// Arguments for the availability check. Empty skips the step.
    #[serde(default = "default_version_args")]
    pub version_args: Vec<String>,

    /// Directory the commands run in. Defaults to the current directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Timeout for a single command in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_program() -> PathBuf {
    PathBuf::from("npm")
}

fn default_args() -> Vec<String> {
    vec!["run".to_string(), "migrate".to_string()]
}

fn default_setup_args() -> Vec<String> {
    vec!["install".to_string()]
}

fn default_version_args() -> Vec<String> {
    vec!["--version".to_string()]
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            setup_args: default_setup_args(),
            version_args: default_version_args(),
            working_dir: None,
            timeout_secs: default_timeout(),
        }
    }
}
