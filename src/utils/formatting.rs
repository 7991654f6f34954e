//! Formatting utilities used for CLI and export outputs.

use crate::models::status::{EntryStatus, SubmissionStatus};
use crate::utils::colors::{CYAN, GREEN, GREY, RED, YELLOW};

/// Human-readable duration, e.g. `+02h 25m` or `-01h 10m`.
pub fn mins2readable(mins: i64, want_sign: bool, short: bool) -> String {
    let abs_m = mins.unsigned_abs();
    let hours = abs_m / 60;
    let minutes = abs_m % 60;

    let sign = if mins > 0 && want_sign {
        "+"
    } else if mins < 0 {
        "-"
    } else {
        ""
    };

    if short {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}h {:02}m", sign, hours, minutes)
    }
}

/// Label and ANSI color for an entry status.
pub fn describe_entry_status(status: EntryStatus) -> (&'static str, &'static str) {
    match status {
        EntryStatus::Draft => ("draft", GREY),
        EntryStatus::Pending => ("pending", YELLOW),
        EntryStatus::Approved => ("approved", GREEN),
        EntryStatus::Rejected => ("rejected", RED),
    }
}

/// Label and ANSI color for a submission status.
pub fn describe_submission_status(status: SubmissionStatus) -> (&'static str, &'static str) {
    match status {
        SubmissionStatus::Pending => ("pending", CYAN),
        SubmissionStatus::Approved => ("approved", GREEN),
        SubmissionStatus::Rejected => ("rejected", RED),
    }
}
