//! Mock database restorer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::restorer::{DatabaseRestorer, RestorerError};

/// Mock implementation of the DatabaseRestorer trait.
///
/// Provides controllable behavior for testing:
/// - Fail a number of removal attempts with a busy error
/// - Fail restore or disconnect
/// - Control the size of the restored database
#[derive(Debug)]
pub struct MockRestorer {
    target: PathBuf,
    /// Removal attempts still to fail as busy.
    busy_remaining: AtomicU32,
    remove_calls: AtomicU32,
    disconnect_calls: AtomicU32,
    restored: Arc<RwLock<Vec<PathBuf>>>,
    next_restore_error: Arc<RwLock<Option<RestorerError>>>,
    next_disconnect_error: Arc<RwLock<Option<RestorerError>>>,
    /// Size the target has after a restore. `None` simulates a missing file.
    restored_size: Arc<RwLock<Option<u64>>>,
    current_size: Arc<RwLock<Option<u64>>>,
    restore_duration: Arc<RwLock<Duration>>,
}

impl Default for MockRestorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRestorer {
    /// Create a new mock restorer with no existing database.
    pub fn new() -> Self {
        Self {
            target: PathBuf::from("/mock/restored.fdb"),
            busy_remaining: AtomicU32::new(0),
            remove_calls: AtomicU32::new(0),
            disconnect_calls: AtomicU32::new(0),
            restored: Arc::new(RwLock::new(Vec::new())),
            next_restore_error: Arc::new(RwLock::new(None)),
            next_disconnect_error: Arc::new(RwLock::new(None)),
            restored_size: Arc::new(RwLock::new(Some(4096))),
            current_size: Arc::new(RwLock::new(None)),
            restore_duration: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Fail the next `n` removal attempts as busy. `u32::MAX` never clears.
    pub fn set_busy_failures(&self, n: u32) {
        self.busy_remaining.store(n, Ordering::SeqCst);
    }

    pub fn remove_count(&self) -> u32 {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> u32 {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    /// Backups passed to `restore`.
    pub async fn restored(&self) -> Vec<PathBuf> {
        self.restored.read().await.clone()
    }

    /// Configure the next restore to fail with the given error.
    pub async fn set_next_restore_error(&self, error: RestorerError) {
        *self.next_restore_error.write().await = Some(error);
    }

    /// Configure the next disconnect to fail with the given error.
    pub async fn set_next_disconnect_error(&self, error: RestorerError) {
        *self.next_disconnect_error.write().await = Some(error);
    }

    /// Size of the target after a restore.
    pub async fn set_restored_size(&self, size: Option<u64>) {
        *self.restored_size.write().await = size;
    }

    /// Simulated restore time.
    pub async fn set_restore_duration(&self, duration: Duration) {
        *self.restore_duration.write().await = duration;
    }
}

#[async_trait]
impl DatabaseRestorer for MockRestorer {
    fn name(&self) -> &str {
        "mock"
    }

    fn target_path(&self) -> &Path {
        &self.target
    }

    async fn remove_target(&self) -> Result<(), RestorerError> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let busy = self
            .busy_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok();
        if busy {
            return Err(RestorerError::Busy {
                path: self.target.clone(),
                source: std::io::Error::from(std::io::ErrorKind::ResourceBusy),
            });
        }
        *self.current_size.write().await = None;
        Ok(())
    }

    async fn force_disconnect_all(&self) -> Result<(), RestorerError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_disconnect_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn restore(&self, backup: &Path) -> Result<(), RestorerError> {
        self.restored.write().await.push(backup.to_path_buf());

        let duration = *self.restore_duration.read().await;
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
        if let Some(error) = self.next_restore_error.write().await.take() {
            return Err(error);
        }
        *self.current_size.write().await = *self.restored_size.read().await;
        Ok(())
    }

    async fn target_size(&self) -> Result<Option<u64>, RestorerError> {
        Ok(*self.current_size.read().await)
    }
}
