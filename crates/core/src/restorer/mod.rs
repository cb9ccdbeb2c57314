//! Working database replacement.

mod config;
mod error;
mod gbak;
mod traits;

pub use config::RestorerConfig;
pub use error::{is_busy_io_error, RestorerError};
pub use gbak::GbakRestorer;
pub use traits::DatabaseRestorer;
