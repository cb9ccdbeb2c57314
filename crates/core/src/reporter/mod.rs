//! Status reporting.
//!
//! The scheduler pushes a `StatusUpdate` to every registered `StatusReporter`
//! after each state change.

mod format;
mod log_reporter;
mod traits;
mod types;

pub use format::{format_interval, status_text};
pub use log_reporter::LogReporter;
pub use traits::StatusReporter;
pub use types::{StatusLevel, StatusUpdate};
