//! 7z-based extractor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::artifact::Artifact;
use crate::process::run_logged;

use super::config::ExtractorConfig;
use super::error::ExtractorError;
use super::traits::ArchiveExtractor;
use super::types::LocalArtifact;

/// Extracts `.7z` archives into the local backup directory.
///
/// Archives are unpacked into a fresh staging directory and every extracted
/// entry is then moved into `local_dir`, replacing files of the same name.
pub struct SevenZipExtractor {
    config: ExtractorConfig,
}

impl SevenZipExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, archive: &Path, out_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.config.seven_zip_path);
        cmd.arg("x")
            .arg("-y")
            .arg(format!("-o{}", out_dir.display()))
            .arg(archive);
        cmd
    }

    async fn extract_into(
        &self,
        artifact: &Artifact,
        staging: &Path,
    ) -> Result<Vec<String>, ExtractorError> {
        fs::create_dir_all(staging).await?;

        let output = run_logged(
            "7z",
            self.build_command(&artifact.path, staging),
            Duration::from_secs(self.config.timeout_secs),
        )
        .await?;

        if !output.success() {
            return Err(ExtractorError::ToolFailed {
                code: output.code(),
                stderr: output.stderr_summary().unwrap_or_default(),
            });
        }

        let mut moved = Vec::new();
        let mut entries = fs::read_dir(staging).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let destination = self.config.local_dir.join(&name);
            move_replacing(&entry.path(), &destination).await?;
            info!("Moved extracted file {}", destination.display());
            moved.push(name.to_string_lossy().into_owned());
        }
        Ok(moved)
    }

    /// Where the name of a differently named backup is remembered for `local_id`.
    fn resolved_marker(&self, local_id: &str) -> PathBuf {
        self.config.local_dir.join(format!(".{}.resolved", local_id))
    }

    /// The backup an earlier extraction of this archive resolved to, if still present.
    async fn previously_resolved(&self, local_id: &str) -> Option<LocalArtifact> {
        let name = fs::read_to_string(self.resolved_marker(local_id)).await.ok()?;
        let name = name.trim();
        // Only a bare file name inside local_dir is trusted.
        if Path::new(name).file_name().map(|n| n == name) != Some(true) {
            return None;
        }
        let path = self.config.local_dir.join(name);
        match fs::try_exists(&path).await {
            Ok(true) => Some(LocalArtifact::new(path)),
            _ => None,
        }
    }
}

/// Moves `from` to `to`, replacing an existing destination.
///
/// Falls back to copy and delete for files when a rename crosses filesystems.
async fn move_replacing(from: &Path, to: &Path) -> Result<(), ExtractorError> {
    if let Ok(meta) = fs::symlink_metadata(to).await {
        let removed = if meta.is_dir() {
            fs::remove_dir_all(to).await
        } else {
            fs::remove_file(to).await
        };
        removed.map_err(|e| ExtractorError::move_failed(from.to_path_buf(), to.to_path_buf(), e))?;
    }

    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            let is_file = fs::metadata(from).await.map(|m| m.is_file()).unwrap_or(false);
            if !is_file {
                return Err(ExtractorError::move_failed(
                    from.to_path_buf(),
                    to.to_path_buf(),
                    rename_err,
                ));
            }
            debug!("Rename failed ({}), copying {} instead", rename_err, from.display());
            fs::copy(from, to)
                .await
                .map_err(|e| ExtractorError::move_failed(from.to_path_buf(), to.to_path_buf(), e))?;
            fs::remove_file(from).await?;
            Ok(())
        }
    }
}

#[async_trait]
impl ArchiveExtractor for SevenZipExtractor {
    fn name(&self) -> &str {
        "7z"
    }

    async fn prepare_local_copy(
        &self,
        artifact: &Artifact,
    ) -> Result<LocalArtifact, ExtractorError> {
        let local_id = self.config.local_id_for(&artifact.id);
        let local_path = self.config.local_dir.join(&local_id);

        if fs::try_exists(&local_path).await? {
            info!(
                artifact = %artifact.id,
                "Local copy {} already exists, skipping extraction", local_id
            );
            return Ok(LocalArtifact {
                id: local_id,
                path: local_path,
            });
        }

        if let Some(local) = self.previously_resolved(&local_id).await {
            info!(
                artifact = %artifact.id,
                "Local copy {} already exists, skipping extraction", local.id
            );
            return Ok(local);
        }

        if !fs::try_exists(&artifact.path).await? {
            return Err(ExtractorError::ArtifactNotFound {
                path: artifact.path.clone(),
            });
        }

        fs::create_dir_all(&self.config.local_dir).await?;
        let staging = self
            .config
            .staging_root()
            .join(Uuid::new_v4().to_string());

        info!(artifact = %artifact.id, "Extracting {}", artifact.path.display());
        let result = self.extract_into(artifact, &staging).await;

        if let Err(e) = fs::remove_dir_all(&staging).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to clean up staging directory {}: {}", staging.display(), e);
            }
        }
        let moved = result?;

        if fs::try_exists(&local_path).await? {
            return Ok(LocalArtifact {
                id: local_id,
                path: local_path,
            });
        }

        // The archive may carry a backup under a different name.
        let suffix = format!(".{}", self.config.local_extension.to_ascii_lowercase());
        let mut candidates: Vec<PathBuf> = moved
            .iter()
            .filter(|name| name.to_ascii_lowercase().ends_with(&suffix))
            .map(|name| self.config.local_dir.join(name))
            .collect();
        if candidates.len() == 1 {
            if let Some(path) = candidates.pop() {
                warn!(
                    artifact = %artifact.id,
                    "Archive did not contain {}, using {}",
                    local_id,
                    path.display()
                );
                let local = LocalArtifact::new(path);
                let marker = self.resolved_marker(&local_id);
                if let Err(e) = fs::write(&marker, &local.id).await {
                    warn!("Failed to record {}: {}", marker.display(), e);
                }
                return Ok(local);
            }
        }

        Err(ExtractorError::MissingOutput {
            artifact: artifact.id.clone(),
            extension: self.config.local_extension.clone(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Writes a fake `7z` that drops `files` into the `-o` directory.
    fn fake_seven_zip(dir: &Path, files: &[&str], exit_code: i32) -> PathBuf {
        let mut script = String::from("#!/bin/sh\nout=\"${3#-o}\"\n");
        for file in files {
            script.push_str(&format!("printf backup > \"$out/{}\"\n", file));
        }
        script.push_str(&format!("echo extracted\nexit {}\n", exit_code));

        let path = dir.join("fake7z");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn setup(files: &[&str], exit_code: i32) -> (TempDir, SevenZipExtractor, Artifact) {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bckfdb-2024-01-02-03.30.7z");
        std::fs::write(&archive, b"archive").unwrap();

        let config = ExtractorConfig {
            seven_zip_path: fake_seven_zip(dir.path(), files, exit_code),
            local_dir: dir.path().join("gbk"),
            timeout_secs: 10,
            ..Default::default()
        };
        let artifact = Artifact::new(archive, Utc::now());
        (dir, SevenZipExtractor::new(config), artifact)
    }

    #[tokio::test]
    async fn test_extracts_and_moves_into_local_dir() {
        let (dir, extractor, artifact) = setup(&["bckfdb-2024-01-02-03.30.gbk"], 0);

        let local = extractor.prepare_local_copy(&artifact).await.unwrap();

        assert_eq!(local.id, "bckfdb-2024-01-02-03.30.gbk");
        assert_eq!(std::fs::read(&local.path).unwrap(), b"backup");
        let staging = dir.path().join("gbk").join(".staging");
        assert_eq!(std::fs::read_dir(staging).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_existing_local_copy_is_noop() {
        let (dir, extractor, artifact) = setup(&[], 1);
        let gbk = dir.path().join("gbk");
        std::fs::create_dir_all(&gbk).unwrap();
        std::fs::write(gbk.join("bckfdb-2024-01-02-03.30.gbk"), b"old").unwrap();

        // The fake tool would fail if it were invoked.
        let local = extractor.prepare_local_copy(&artifact).await.unwrap();
        assert_eq!(std::fs::read(local.path).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_single_differently_named_backup_is_used() {
        let (_dir, extractor, artifact) = setup(&["FDB.GBK", "readme.txt"], 0);
        let local = extractor.prepare_local_copy(&artifact).await.unwrap();
        assert_eq!(local.id, "FDB.GBK");
    }

    #[tokio::test]
    async fn test_differently_named_backup_is_not_extracted_again() {
        let (dir, extractor, artifact) = setup(&["FDB.GBK"], 0);
        let first = extractor.prepare_local_copy(&artifact).await.unwrap();

        // Any further invocation of the tool would fail.
        fake_seven_zip(dir.path(), &[], 1);
        let second = extractor.prepare_local_copy(&artifact).await.unwrap();
        assert_eq!(second, first);

        // Once the backup is gone the archive is extracted again.
        std::fs::remove_file(&first.path).unwrap();
        let err = extractor.prepare_local_copy(&artifact).await.unwrap_err();
        assert!(matches!(err, ExtractorError::ToolFailed { code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_tool_failure_cleans_staging() {
        let (dir, extractor, artifact) = setup(&["partial.gbk"], 2);

        let err = extractor.prepare_local_copy(&artifact).await.unwrap_err();
        assert!(matches!(err, ExtractorError::ToolFailed { code: Some(2), .. }));

        let staging = dir.path().join("gbk").join(".staging");
        assert_eq!(std::fs::read_dir(staging).unwrap().count(), 0);
        assert!(!dir.path().join("gbk").join("partial.gbk").exists());
    }

    #[tokio::test]
    async fn test_no_backup_in_archive() {
        let (_dir, extractor, artifact) = setup(&["readme.txt"], 0);
        let err = extractor.prepare_local_copy(&artifact).await.unwrap_err();
        assert!(matches!(err, ExtractorError::MissingOutput { .. }));
    }
}
