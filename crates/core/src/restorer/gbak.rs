//! Firebird restorer driving `gbak` and `gfix`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tracing::{info, warn};

use crate::process::{run_logged, ProcessOutput};

use super::config::RestorerConfig;
use super::error::RestorerError;
use super::traits::DatabaseRestorer;

/// Restores Firebird backups with `gbak -r` and disconnects users with `gfix`.
pub struct GbakRestorer {
    config: RestorerConfig,
}

impl GbakRestorer {
    pub fn new(config: RestorerConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    fn gfix_command(&self, mode: &[&str]) -> Command {
        let mut cmd = Command::new(&self.config.gfix_path);
        cmd.args(mode)
            .arg("-user")
            .arg(&self.config.user)
            .arg("-pass")
            .arg(&self.config.password)
            .arg(&self.config.database_path);
        cmd
    }

    fn gbak_command(&self, backup: &Path) -> Command {
        let mut cmd = Command::new(&self.config.gbak_path);
        cmd.arg("-r")
            .arg(backup)
            .arg(&self.config.database_path)
            .arg("-user")
            .arg(&self.config.user)
            .arg("-pas")
            .arg(&self.config.password)
            .arg("-v")
            .arg("-rep");
        cmd
    }
}

fn check(tool: &str, output: ProcessOutput) -> Result<(), RestorerError> {
    if output.success() {
        Ok(())
    } else {
        Err(RestorerError::ToolFailed {
            tool: tool.to_string(),
            code: output.code(),
            stderr: output.stderr_summary().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl DatabaseRestorer for GbakRestorer {
    fn name(&self) -> &str {
        "gbak"
    }

    fn target_path(&self) -> &Path {
        &self.config.database_path
    }

    async fn remove_target(&self) -> Result<(), RestorerError> {
        let path = &self.config.database_path;
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("Removed existing database {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RestorerError::from_io(path, e)),
        }
    }

    async fn force_disconnect_all(&self) -> Result<(), RestorerError> {
        info!("Disconnecting all users from {}", self.config.database_path.display());

        let shutdown = run_logged(
            "gfix",
            self.gfix_command(&["-shut", "full", "-force", "0"]),
            self.timeout(),
        )
        .await?;
        let shutdown_result = check("gfix", shutdown);

        tokio::time::sleep(Duration::from_millis(self.config.disconnect_settle_ms)).await;

        // Always try to bring the database back online, even if shutdown failed.
        let online = run_logged("gfix", self.gfix_command(&["-online"]), self.timeout()).await?;
        if let Err(e) = check("gfix", online) {
            warn!("Failed to bring database back online: {}", e);
        }

        shutdown_result
    }

    async fn restore(&self, backup: &Path) -> Result<(), RestorerError> {
        let target = &self.config.database_path;
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RestorerError::from_io(parent, e))?;
        }

        info!(
            "Restoring {} into {}",
            backup.display(),
            target.display()
        );
        let output = run_logged("gbak", self.gbak_command(backup), self.timeout()).await?;
        info!("gbak finished in {:.1}s", output.elapsed.as_secs_f64());
        check("gbak", output)
    }

    async fn target_size(&self) -> Result<Option<u64>, RestorerError> {
        let path = &self.config.database_path;
        match fs::metadata(path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RestorerError::from_io(path, e)),
        }
    }
}
