//! Streak and capacity limits, checked before an entry is saved.
//!
//! Both checks are pure: they read settings and figures and never mutate.

use crate::models::status::EntryStatus;
use crate::models::toil_entry::ToilEntry;
use crate::models::toil_settings::ToilSettings;
use crate::utils::date::{window_end, window_start};
use crate::utils::time::format_duration;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyCheck {
    pub allowed: bool,
    /// Remaining allowance in minutes, never negative.
    pub remaining: i64,
}

/// Sum of used minutes in the trailing window strictly before `target`.
///
/// The window spans `max_streak_days - 1` days. Rejected entries never
/// count; drafts and pending entries do, since they may still be approved.
pub fn streak_window_minutes(
    settings: &ToilSettings,
    recent_entries: &[ToilEntry],
    target: NaiveDate,
) -> i64 {
    let from = window_start(target, settings.streak_lookback_days());
    recent_entries
        .iter()
        .filter(|e| e.date >= from && e.date < target)
        .filter(|e| e.status != EntryStatus::Rejected)
        .map(ToilEntry::used_minutes)
        .sum()
}

/// Highest used total over every `max_streak_days` window containing `target`,
/// leaving out whatever is stored for `target` itself.
///
/// The first of these windows is the trailing one from
/// [`streak_window_minutes`]; the others reach past `target`.
pub fn streak_peak_minutes(
    settings: &ToilSettings,
    entries: &[ToilEntry],
    target: NaiveDate,
) -> i64 {
    let span = settings.streak_lookback_days();
    let counted: Vec<&ToilEntry> = entries
        .iter()
        .filter(|e| e.date != target && e.status != EntryStatus::Rejected)
        .collect();

    (1..=span)
        .map(|shift| {
            let from = window_start(target, span - shift);
            let to = window_end(target, shift);
            counted
                .iter()
                .filter(|e| e.date >= from && e.date <= to)
                .map(|e| e.used_minutes())
                .sum::<i64>()
        })
        .fold(streak_window_minutes(settings, entries, target), i64::max)
}

/// Allowed when `requested_used` on `target` keeps every window containing
/// it within `max_streak_hours`.
pub fn check_streak_limit(
    settings: &ToilSettings,
    entries: &[ToilEntry],
    target: NaiveDate,
    requested_used: i64,
) -> PolicyCheck {
    let limit = settings.streak_minutes();
    let peak = streak_peak_minutes(settings, entries, target);
    PolicyCheck {
        allowed: peak + requested_used <= limit,
        remaining: (limit - peak).max(0),
    }
}

pub fn check_capacity_limit(
    settings: &ToilSettings,
    current_balance: i64,
    requested: i64,
) -> PolicyCheck {
    let limit = settings.capacity_minutes();
    PolicyCheck {
        allowed: current_balance + requested <= limit,
        remaining: (limit - current_balance).max(0),
    }
}

pub fn streak_message(settings: &ToilSettings, check: &PolicyCheck) -> String {
    format!(
        "TOIL streak limit reached: only {} can be used within {} consecutive day(s) (limit {}).",
        format_duration(check.remaining),
        settings.max_streak_days,
        settings.max_streak_hours
    )
}

pub fn capacity_message(settings: &ToilSettings, check: &PolicyCheck) -> String {
    format!(
        "TOIL capacity limit reached: only {} remaining before the maximum balance of {}.",
        format_duration(check.remaining),
        settings.max_capacity
    )
}
