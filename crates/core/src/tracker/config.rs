//! Configuration for the processed-artifact tracker.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the processed record lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Append-only text file, one identifier per line.
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("last_processed.txt")
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
