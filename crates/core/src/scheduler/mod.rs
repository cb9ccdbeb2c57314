//! Interval scheduler for the pipeline.
//!
//! State machine:
//! `Idle --start--> Running --stop--> Idle`, `restart` is stop then start,
//! `set_interval` updates a running loop in place, and `exit` ends in the
//! terminal `Stopped` state from anywhere.

mod config;
mod persist;
mod runner;
mod types;

pub use config::SchedulerConfig;
pub use runner::Scheduler;
pub use types::{SchedulerError, SchedulerState, SchedulerStatus};
