use restorekeeper_core::{Config, SanitizedConfig, Scheduler};
use std::sync::Arc;

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    scheduler: Arc<Scheduler>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(config: Config, scheduler: Arc<Scheduler>, ws_broadcaster: WsBroadcaster) -> Self {
        Self {
            config,
            scheduler,
            ws_broadcaster,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}
