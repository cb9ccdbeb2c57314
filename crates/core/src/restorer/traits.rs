//! Trait definitions for the restorer module.

use std::path::Path;

use async_trait::async_trait;

use super::error::RestorerError;

/// Replaces the working database from a backup file.
#[async_trait]
pub trait DatabaseRestorer: Send + Sync {
    /// Returns the name of this restorer implementation.
    fn name(&self) -> &str;

    /// The working database this restorer replaces.
    fn target_path(&self) -> &Path;

    /// Deletes the working database. A missing target is not an error.
    ///
    /// Returns `RestorerError::Busy` when the file is held open.
    async fn remove_target(&self) -> Result<(), RestorerError>;

    /// Forces every client off the working database.
    async fn force_disconnect_all(&self) -> Result<(), RestorerError>;

    /// Restores `backup` into the working database.
    async fn restore(&self, backup: &Path) -> Result<(), RestorerError>;

    /// Size of the working database in bytes, `None` if it does not exist.
    async fn target_size(&self) -> Result<Option<u64>, RestorerError>;
}
