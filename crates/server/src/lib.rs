//! HTTP control surface for the restore scheduler.

pub mod api;
pub mod metrics;
pub mod state;
