//! Migration runner backed by an external command.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::process::run_logged;

use super::config::MigrationConfig;
use super::error::MigrationError;
use super::traits::MigrationRunner;

/// Runs `<program> <args>` (by default `npm run migrate`).
pub struct CommandMigrationRunner {
    config: MigrationConfig,
}

impl CommandMigrationRunner {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    fn tool_name(&self) -> String {
        self.config
            .program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "migration".to_string())
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(args);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    async fn run_step(&self, args: &[String]) -> Result<(), MigrationError> {
        let tool = self.tool_name();
        let step = format!("{} {}", tool, args.join(" "));
        info!("Running {}", step);

        let output = run_logged(
            &tool,
            self.command(args),
            Duration::from_secs(self.config.timeout_secs),
        )
        .await?;

        if output.success() {
            info!("{} finished in {:.1}s", step, output.elapsed.as_secs_f64());
            Ok(())
        } else {
            Err(MigrationError::CommandFailed {
                step,
                code: output.code(),
                stderr: output.stderr_summary().unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl MigrationRunner for CommandMigrationRunner {
    fn name(&self) -> &str {
        "command"
    }

    async fn ensure_dependencies(&self) -> Result<(), MigrationError> {
        if !self.config.version_args.is_empty() {
            self.run_step(&self.config.version_args).await?;
        }
        if !self.config.setup_args.is_empty() {
            self.run_step(&self.config.setup_args).await?;
        }
        Ok(())
    }

    async fn run(&self) -> Result<(), MigrationError> {
        self.run_step(&self.config.args).await
    }
}
