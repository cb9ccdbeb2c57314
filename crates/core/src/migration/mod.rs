//! Downstream data migration.

mod command;
mod config;
mod error;
mod traits;

pub use command::CommandMigrationRunner;
pub use config::MigrationConfig;
pub use error::MigrationError;
pub use traits::MigrationRunner;
