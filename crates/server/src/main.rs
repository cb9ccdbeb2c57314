use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restorekeeper_core::{
    create_extractor, load_config, load_config_from_env, validate_config, ArtifactSource,
    ArtifactTracker, CommandMigrationRunner, Config, DatabaseRestorer, DirArtifactSource,
    FileArtifactTracker, GbakRestorer, LogReporter, MigrationRunner, PipelineRunner, Scheduler,
    StatusReporter,
};
use restorekeeper_server::api::{create_router, WsBroadcaster};
use restorekeeper_server::state::AppState;

/// Environment variable holding the config file path
const CONFIG_PATH_VAR: &str = "RESTOREKEEPER_CONFIG";

/// Config file used when the variable is unset
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Watching {:?} for {}*.{}",
        config.source.dir, config.source.prefix, config.source.extension
    );
    info!("Database path: {:?}", config.restorer.database_path);
    info!("Processed record: {:?}", config.tracker.path);

    // Capabilities
    let source: Arc<dyn ArtifactSource> = Arc::new(DirArtifactSource::new(config.source.clone()));
    let tracker: Arc<dyn ArtifactTracker> = Arc::new(FileArtifactTracker::new(&config.tracker));
    let extractor = create_extractor(&config.extractor);
    let restorer: Arc<dyn DatabaseRestorer> =
        Arc::new(GbakRestorer::new(config.restorer.clone()));
    let migration: Arc<dyn MigrationRunner> =
        Arc::new(CommandMigrationRunner::new(config.migration.clone()));
    info!(
        "Using source {}, extractor {}, restorer {}, migration {}",
        source.name(),
        extractor.name(),
        restorer.name(),
        migration.name()
    );

    let pipeline = Arc::new(PipelineRunner::new(
        config.pipeline.clone(),
        source,
        tracker,
        extractor,
        restorer,
        migration,
    ));

    // Status goes to the log and to WebSocket clients
    let ws_broadcaster = WsBroadcaster::default();
    let reporters: Vec<Arc<dyn StatusReporter>> = vec![
        Arc::new(LogReporter::new()),
        Arc::new(ws_broadcaster.clone()),
    ];
    let scheduler = Arc::new(Scheduler::with_reporters(
        config.scheduler.clone(),
        pipeline,
        reporters,
    ));

    if config.scheduler.autostart {
        scheduler
            .start()
            .await
            .context("Failed to start scheduler")?;
    } else {
        info!("Autostart disabled, waiting for a start command");
    }

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&scheduler),
        ws_broadcaster,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if let Err(e) = scheduler.exit().await {
        warn!("Scheduler did not exit cleanly: {}", e);
    }
    info!("Scheduler exited");

    Ok(())
}

/// Load configuration.
///
/// An explicitly configured file must exist. Without one, a missing
/// `config.toml` falls back to environment variables and defaults.
fn load() -> Result<Config> {
    let (config_path, explicit) = match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) => (PathBuf::from(path), true),
        Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !explicit && !config_path.exists() {
        info!(
            "No {} found, using environment and defaults",
            DEFAULT_CONFIG_PATH
        );
        return load_config_from_env().context("Failed to load config from environment");
    }

    info!("Loading configuration from {:?}", config_path);
    load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
