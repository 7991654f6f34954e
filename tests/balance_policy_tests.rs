mod common;

use common::{d, entry};
use toil_ledger::core::balance::{compute_balance, pending_delta};
use toil_ledger::core::policy::{
    capacity_message, check_capacity_limit, check_streak_limit, streak_message,
    streak_peak_minutes, streak_window_minutes,
};
use toil_ledger::models::status::EntryStatus;
use toil_ledger::models::toil_settings::ToilSettings;
use chrono::NaiveDate;
use toil_ledger::utils::date::{week_end, week_start, window_end, window_start};

#[test]
fn test_balance_counts_only_approved_entries() {
    let entries = vec![
        entry("2025-03-03", "08:00", "00:00", EntryStatus::Approved),
        entry("2025-03-04", "02:00", "01:00", EntryStatus::Approved),
        entry("2025-03-05", "04:00", "00:00", EntryStatus::Pending),
        entry("2025-03-06", "03:00", "00:00", EntryStatus::Draft),
        entry("2025-03-07", "05:00", "00:00", EntryStatus::Rejected),
    ];
    assert_eq!(compute_balance(&entries), 8 * 60 + 60);
    assert_eq!(pending_delta(&entries), 7 * 60);
}

#[test]
fn test_balance_is_pure_and_may_go_negative() {
    let entries = vec![
        entry("2025-03-03", "01:00", "00:00", EntryStatus::Approved),
        entry("2025-03-10", "00:00", "03:00", EntryStatus::Approved),
    ];
    let first = compute_balance(&entries);
    let second = compute_balance(&entries);
    assert_eq!(first, -120);
    assert_eq!(first, second);
    assert_eq!(compute_balance(&[]), 0);
}

#[test]
fn test_week_helpers() {
    // 2025-03-05 is a Wednesday
    assert_eq!(week_start(d("2025-03-05")), d("2025-03-03"));
    assert_eq!(week_end(d("2025-03-05")), d("2025-03-09"));
    assert_eq!(week_start(d("2025-03-03")), d("2025-03-03"));
    assert_eq!(week_start(d("2025-03-09")), d("2025-03-03"));
    assert_eq!(window_start(d("2025-03-05"), 1), d("2025-03-04"));
    assert_eq!(window_start(d("2025-03-05"), 0), d("2025-03-05"));
    assert_eq!(window_end(d("2025-03-05"), 1), d("2025-03-06"));
    assert_eq!(window_start(d("2025-03-05"), u64::MAX), NaiveDate::MIN);
    assert_eq!(window_end(d("2025-03-05"), u64::MAX), NaiveDate::MAX);
}

#[test]
fn test_streak_window_excludes_target_and_rejected() {
    let settings = ToilSettings {
        max_streak_days: 3,
        ..ToilSettings::defaults_for("ann@example.com")
    };
    let recent = vec![
        entry("2025-03-01", "00:00", "05:00", EntryStatus::Approved), // outside the window
        entry("2025-03-02", "00:00", "04:00", EntryStatus::Draft),
        entry("2025-03-03", "00:00", "03:00", EntryStatus::Rejected),
        entry("2025-03-04", "00:00", "02:00", EntryStatus::Pending),
        entry("2025-03-04", "00:00", "06:00", EntryStatus::Approved),
    ];
    // window for 2025-03-04 with 3 days: [03-02, 03-04)
    assert_eq!(streak_window_minutes(&settings, &recent, d("2025-03-04")), 4 * 60);
}

#[test]
fn test_streak_limit_boundary() {
    let settings = ToilSettings::defaults_for("ann@example.com");
    let recent = vec![entry("2025-03-10", "00:00", "10:00", EntryStatus::Draft)];

    let ok = check_streak_limit(&settings, &recent, d("2025-03-11"), 6 * 60);
    assert!(ok.allowed);
    assert_eq!(ok.remaining, 6 * 60);

    let denied = check_streak_limit(&settings, &recent, d("2025-03-11"), 7 * 60);
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 6 * 60);
    assert!(streak_message(&settings, &denied).contains("06:00"));
}

#[test]
fn test_single_day_streak_only_counts_the_request() {
    let settings = ToilSettings {
        max_streak_days: 1,
        max_streak_hours: "08:00".into(),
        ..ToilSettings::defaults_for("ann@example.com")
    };
    let recent = vec![entry("2025-03-10", "00:00", "08:00", EntryStatus::Approved)];
    assert!(check_streak_limit(&settings, &recent, d("2025-03-11"), 8 * 60).allowed);
    assert!(!check_streak_limit(&settings, &recent, d("2025-03-11"), 8 * 60 + 15).allowed);
}

#[test]
fn test_capacity_limit_boundary() {
    let settings = ToilSettings::defaults_for("ann@example.com");

    let exact = check_capacity_limit(&settings, 39 * 60, 60);
    assert!(exact.allowed);

    let denied = check_capacity_limit(&settings, 39 * 60, 120);
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 60);
    assert!(capacity_message(&settings, &denied).contains("01:00"));

    let over = check_capacity_limit(&settings, 45 * 60, 15);
    assert!(!over.allowed);
    assert_eq!(over.remaining, 0);
}

#[test]
fn test_streak_limit_counts_days_after_the_target() {
    let settings = ToilSettings::defaults_for("ann@example.com");
    let later = vec![entry("2025-03-04", "00:00", "10:00", EntryStatus::Draft)];

    let denied = check_streak_limit(&settings, &later, d("2025-03-03"), 7 * 60);
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 6 * 60);
    assert!(check_streak_limit(&settings, &later, d("2025-03-03"), 6 * 60).allowed);

    // nothing after the target: same as the trailing window
    let before = vec![entry("2025-03-02", "00:00", "04:00", EntryStatus::Draft)];
    assert_eq!(
        streak_peak_minutes(&settings, &before, d("2025-03-03")),
        streak_window_minutes(&settings, &before, d("2025-03-03"))
    );
}

#[test]
fn test_streak_peak_takes_the_fullest_window() {
    let settings = ToilSettings {
        max_streak_days: 3,
        ..ToilSettings::defaults_for("ann@example.com")
    };
    let around = vec![
        entry("2025-03-08", "00:00", "02:00", EntryStatus::Approved),
        entry("2025-03-09", "00:00", "03:00", EntryStatus::Pending),
        entry("2025-03-10", "00:00", "08:00", EntryStatus::Draft), // the target, replaced
        entry("2025-03-11", "00:00", "05:00", EntryStatus::Draft),
        entry("2025-03-12", "00:00", "04:00", EntryStatus::Rejected),
        entry("2025-03-13", "00:00", "09:00", EntryStatus::Approved), // outside every window
    ];
    // [08..10] = 5h, [09..11] = 8h, [10..12] = 5h
    assert_eq!(streak_peak_minutes(&settings, &around, d("2025-03-10")), 8 * 60);

    let check = check_streak_limit(&settings, &around, d("2025-03-10"), 8 * 60);
    assert!(check.allowed);
    assert_eq!(check.remaining, 8 * 60);
    assert!(!check_streak_limit(&settings, &around, d("2025-03-10"), 8 * 60 + 15).allowed);
}

#[test]
fn test_oversized_streak_days_are_clamped() {
    let settings = ToilSettings {
        max_streak_days: i64::MAX,
        max_streak_hours: "08:00".into(),
        ..ToilSettings::defaults_for("ann@example.com")
    };
    assert_eq!(settings.streak_lookback_days(), 365);

    let long_ago = vec![entry("2024-03-11", "00:00", "06:00", EntryStatus::Approved)];
    assert!(!check_streak_limit(&settings, &long_ago, d("2025-03-10"), 3 * 60).allowed);
}
