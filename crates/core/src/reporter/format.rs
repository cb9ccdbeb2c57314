//! Operator-facing text.

use chrono::{DateTime, Local, Utc};

use crate::scheduler::{SchedulerState, SchedulerStatus};

/// Formats an interval in minutes for display.
///
/// Below an hour shows minutes, below a day shows rounded hours, otherwise
/// rounded days.
pub fn format_interval(minutes: u32) -> String {
    const HOUR: u32 = 60;
    const DAY: u32 = 24 * HOUR;

    if minutes < HOUR {
        plural(minutes, "minute")
    } else if minutes < DAY {
        plural((minutes + HOUR / 2) / HOUR, "hour")
    } else {
        plural((minutes + DAY / 2) / DAY, "day")
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Summary line for the current state.
pub fn status_text(state: &SchedulerState) -> String {
    match state.status {
        SchedulerStatus::Stopped => return "Scheduler exited".to_string(),
        SchedulerStatus::Stopping => return "Scheduler stopping...".to_string(),
        SchedulerStatus::Idle => return "Scheduler stopped".to_string(),
        SchedulerStatus::Running => {}
    }

    if state.run_in_progress {
        return "Pipeline run in progress".to_string();
    }
    if let Some(err) = &state.last_error {
        return format!("Last run failed: {}", err);
    }
    match (state.last_run_at, state.next_run_at) {
        (Some(last), Some(next)) => format!("Last run: {}\nNext run: {}", clock(last), clock(next)),
        _ => "Waiting for first run...".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(1), "1 minute");
        assert_eq!(format_interval(5), "5 minutes");
        assert_eq!(format_interval(59), "59 minutes");
        assert_eq!(format_interval(60), "1 hour");
        assert_eq!(format_interval(90), "2 hours");
        assert_eq!(format_interval(120), "2 hours");
        assert_eq!(format_interval(720), "12 hours");
        assert_eq!(format_interval(1440), "1 day");
        assert_eq!(format_interval(4320), "3 days");
    }

    #[test]
    fn test_status_text() {
        let mut state = SchedulerState::new(60);
        assert_eq!(status_text(&state), "Scheduler stopped");

        state.status = SchedulerStatus::Running;
        assert_eq!(status_text(&state), "Waiting for first run...");

        state.last_run_at = Some(Utc::now());
        state.next_run_at = Some(Utc::now());
        assert!(status_text(&state).starts_with("Last run: "));

        state.last_error = Some("database in use".to_string());
        assert_eq!(status_text(&state), "Last run failed: database in use");

        state.run_in_progress = true;
        assert_eq!(status_text(&state), "Pipeline run in progress");

        state.status = SchedulerStatus::Stopped;
        assert_eq!(status_text(&state), "Scheduler exited");
    }
}
