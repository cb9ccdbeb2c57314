//! Processed-artifact tracking.
//!
//! Decides which artifact to handle next and records artifacts once a pipeline
//! run has fully succeeded for them.

mod config;
mod error;
mod file_tracker;
mod traits;
mod types;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use file_tracker::FileArtifactTracker;
pub use traits::ArtifactTracker;
pub use types::ProcessedSet;
