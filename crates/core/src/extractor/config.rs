//! Configuration for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which extractor implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Unpack `.7z` archives with the `7z` command line tool.
    #[default]
    SevenZip,
    /// Use source artifacts as-is.
    Passthrough,
}

/// Configuration for preparing local restore inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub kind: ExtractorKind,

    /// Path to the 7z binary.
    #[serde(default = "default_seven_zip_path")]
    pub seven_zip_path: PathBuf,

    /// Directory holding prepared backup files.
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Scratch directory for extraction. Defaults to `<local_dir>/.staging`,
    /// which keeps moves on the same filesystem.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    /// Extension of the prepared backup file, without the dot.
    #[serde(default = "default_local_extension")]
    pub local_extension: String,

    /// Timeout for a single extraction in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_seven_zip_path() -> PathBuf {
    PathBuf::from("7z")
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("gbk")
}

fn default_local_extension() -> String {
    "gbk".to_string()
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::default(),
            seven_zip_path: default_seven_zip_path(),
            local_dir: default_local_dir(),
            staging_dir: None,
            local_extension: default_local_extension(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ExtractorConfig {
    /// Effective staging directory.
    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| self.local_dir.join(".staging"))
    }

    /// Local file name expected for an archive named `artifact_id`.
    pub fn local_id_for(&self, artifact_id: &str) -> String {
        let stem = std::path::Path::new(artifact_id)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| artifact_id.to_string());
        format!("{}.{}", stem, self.local_extension)
    }
}
