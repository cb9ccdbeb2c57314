//! Backup artifact discovery.
//!
//! An artifact is a timestamped backup file dropped into a directory by an external
//! job. The `ArtifactSource` trait enumerates them newest first; `DirArtifactSource`
//! is the filesystem implementation.

mod config;
mod dir_source;
mod error;
mod traits;
mod types;

pub use config::SourceConfig;
pub use dir_source::DirArtifactSource;
pub use error::SourceError;
pub use traits::ArtifactSource;
pub use types::{parse_name_stamp, sort_newest_first, Artifact};
