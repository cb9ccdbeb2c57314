//! Mock migration runner for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::migration::{MigrationError, MigrationRunner};

/// Mock implementation of the MigrationRunner trait.
#[derive(Debug)]
pub struct MockMigrationRunner {
    setup_calls: AtomicU32,
    run_calls: AtomicU32,
    next_setup_error: Arc<RwLock<Option<MigrationError>>>,
    next_run_error: Arc<RwLock<Option<MigrationError>>>,
}

impl Default for MockMigrationRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMigrationRunner {
    /// Create a new mock migration runner.
    pub fn new() -> Self {
        Self {
            setup_calls: AtomicU32::new(0),
            run_calls: AtomicU32::new(0),
            next_setup_error: Arc::new(RwLock::new(None)),
            next_run_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn setup_count(&self) -> u32 {
        self.setup_calls.load(Ordering::SeqCst)
    }

    pub fn run_count(&self) -> u32 {
        self.run_calls.load(Ordering::SeqCst)
    }

    /// Configure the next `ensure_dependencies` to fail.
    pub async fn set_next_setup_error(&self, error: MigrationError) {
        *self.next_setup_error.write().await = Some(error);
    }

    /// Configure the next `run` to fail.
    pub async fn set_next_run_error(&self, error: MigrationError) {
        *self.next_run_error.write().await = Some(error);
    }

    /// A failed command, as a non-zero exit would produce.
    pub fn command_failed(code: i32) -> MigrationError {
        MigrationError::CommandFailed {
            step: "npm run migrate".to_string(),
            code: Some(code),
            stderr: "migration failed".to_string(),
        }
    }
}

#[async_trait]
impl MigrationRunner for MockMigrationRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ensure_dependencies(&self) -> Result<(), MigrationError> {
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_setup_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn run(&self) -> Result<(), MigrationError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_run_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
