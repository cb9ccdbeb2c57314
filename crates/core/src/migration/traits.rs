//! Trait definitions for the migration module.

use async_trait::async_trait;

use super::error::MigrationError;

/// Runs the downstream migration against the freshly restored database.
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Checks the runner is available and installs its dependencies.
    async fn ensure_dependencies(&self) -> Result<(), MigrationError>;

    /// Runs the migration. A non-zero exit is an error.
    async fn run(&self) -> Result<(), MigrationError>;
}
