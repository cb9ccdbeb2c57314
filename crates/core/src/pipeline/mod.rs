//! Restore and migrate pipeline.
//!
//! `PipelineRunner` performs one end-to-end attempt per call. It never raises:
//! every failure becomes a `RunOutcome::Failed` with a `FailureKind`.

mod config;
mod error;
mod runner;
mod traits;
mod types;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use runner::PipelineRunner;
pub use traits::Pipeline;
pub use types::{FailureKind, Phase, PhaseTiming, PipelineRun, RunOutcome};
