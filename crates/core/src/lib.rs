pub mod artifact;
pub mod config;
pub mod extractor;
pub mod metrics;
pub mod migration;
pub mod pipeline;
pub mod process;
pub mod reporter;
pub mod restorer;
pub mod scheduler;
pub mod testing;
pub mod tracker;

pub use artifact::{Artifact, ArtifactSource, DirArtifactSource, SourceConfig, SourceError};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use extractor::{
    create_extractor, ArchiveExtractor, ExtractorConfig, ExtractorError, ExtractorKind,
    LocalArtifact, PassthroughExtractor, SevenZipExtractor,
};
pub use migration::{CommandMigrationRunner, MigrationConfig, MigrationError, MigrationRunner};
pub use pipeline::{
    FailureKind, Phase, Pipeline, PipelineConfig, PipelineError, PipelineRun, PipelineRunner,
    RunOutcome,
};
pub use process::{run_logged, ProcessError, ProcessOutput};
pub use reporter::{
    format_interval, status_text, LogReporter, StatusLevel, StatusReporter, StatusUpdate,
};
pub use restorer::{DatabaseRestorer, GbakRestorer, RestorerConfig, RestorerError};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerError, SchedulerState, SchedulerStatus};
pub use tracker::{ArtifactTracker, FileArtifactTracker, ProcessedSet, TrackerConfig, TrackerError};
