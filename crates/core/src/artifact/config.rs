//! Configuration for the artifact source.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where backup artifacts are found and which files count as artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory the external backup job writes into.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Required file name prefix. Empty accepts any name.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Required file extension, without the dot. Empty accepts any extension.
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_prefix() -> String {
    "bckfdb-".to_string()
}

fn default_extension() -> String {
    "7z".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            prefix: default_prefix(),
            extension: default_extension(),
        }
    }
}

impl SourceConfig {
    /// Whether `file_name` matches the configured prefix and extension.
    pub fn matches(&self, file_name: &str) -> bool {
        if !file_name.starts_with(&self.prefix) {
            return false;
        }
        if self.extension.is_empty() {
            return true;
        }
        std::path::Path::new(file_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(self.extension.as_str()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_backup_archives() {
        let config = SourceConfig::default();
        assert!(config.matches("bckfdb-2024-01-02-03.30.7z"));
        assert!(config.matches("bckfdb-2024-01-02-03.30.7Z"));
        assert!(!config.matches("bckfdb-2024-01-02-03.30.zip"));
        assert!(!config.matches("other-2024-01-02.7z"));
    }

    #[test]
    fn test_empty_filters_accept_everything() {
        let config = SourceConfig {
            dir: PathBuf::from("."),
            prefix: String::new(),
            extension: String::new(),
        };
        assert!(config.matches("anything"));
        assert!(config.matches("bck-2024-01-01.ext"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SourceConfig = toml::from_str(r#"dir = "/srv/backups""#).unwrap();
        assert_eq!(config.dir, PathBuf::from("/srv/backups"));
        assert_eq!(config.prefix, "bckfdb-");
        assert_eq!(config.extension, "7z");
    }
}
