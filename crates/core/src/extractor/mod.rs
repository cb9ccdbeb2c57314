//! Preparation of local restore inputs from source artifacts.

mod config;
mod error;
mod passthrough;
mod seven_zip;
mod traits;
mod types;

use std::sync::Arc;

pub use config::{ExtractorConfig, ExtractorKind};
pub use error::ExtractorError;
pub use passthrough::PassthroughExtractor;
pub use seven_zip::SevenZipExtractor;
pub use traits::ArchiveExtractor;
pub use types::LocalArtifact;

/// Builds the extractor selected by `config.kind`.
pub fn create_extractor(config: &ExtractorConfig) -> Arc<dyn ArchiveExtractor> {
    match config.kind {
        ExtractorKind::SevenZip => Arc::new(SevenZipExtractor::new(config.clone())),
        ExtractorKind::Passthrough => Arc::new(PassthroughExtractor::new()),
    }
}
