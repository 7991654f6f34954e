mod common;

use common::{ANN, BOB, ann, boss, d, memory_pool, seed_entry};
use std::fs;
use toil_ledger::db::pool::DbPool;
use toil_ledger::db::timesheet::insert_time_entry;
use toil_ledger::errors::AppError;
use toil_ledger::export::csv::time_entries_to_string;
use toil_ledger::export::range::parse_range;
use toil_ledger::export::{ExportData, ExportFormat, ExportLogic, ExportOptions};
use toil_ledger::models::outcome::FailureKind;
use toil_ledger::models::status::EntryStatus;
use toil_ledger::models::timesheet::{NewTimeEntry, TimeEntry};

fn time_entry(user: &str, project: &str, task: &str, notes: Option<&str>) -> NewTimeEntry {
    NewTimeEntry {
        user_id: user.to_string(),
        project: project.to_string(),
        task: task.to_string(),
        subtask: Some("API".to_string()),
        ticket: Some("OPS-12".to_string()),
        date: d("2025-03-03"),
        hours: "02:30".to_string(),
        notes: notes.map(String::from),
    }
}

fn seeded_pool() -> DbPool {
    let pool = memory_pool();
    for entry in [
        time_entry(ANN, "Apollo", "Backend", Some("plain")),
        time_entry(BOB, "Gemini", "Frontend", None),
    ] {
        pool.run(|conn| insert_time_entry(conn, &entry)).unwrap();
    }
    pool
}

fn options(file: std::path::PathBuf) -> ExportOptions {
    ExportOptions {
        data: ExportData::Hours,
        format: ExportFormat::Csv,
        file,
        range: None,
        user: None,
        project: None,
        task: None,
        by_task: false,
        force: false,
    }
}

fn entry_with_notes(notes: &str) -> TimeEntry {
    TimeEntry {
        id: 1,
        user_id: ANN.to_string(),
        project: "Apollo, Ltd".to_string(),
        task: "Backend".to_string(),
        subtask: None,
        ticket: None,
        date: d("2025-03-03"),
        hours: "01:00".to_string(),
        notes: Some(notes.to_string()),
        created_at: String::new(),
    }
}

#[test]
fn test_csv_quotes_only_when_needed() {
    let csv = time_entries_to_string(&[entry_with_notes("said \"hi\"\nthen left")], false).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("User,Project,Task,Subtask,Ticket,Date,Hours,Notes")
    );
    assert!(csv.contains("ann@example.com,\"Apollo, Ltd\",Backend,,,2025-03-03,01:00,"));
    assert!(csv.contains("\"said \"\"hi\"\"\nthen left\""));
}

#[test]
fn test_csv_task_variant_drops_project() {
    let csv = time_entries_to_string(&[entry_with_notes("ok")], true).unwrap();
    assert_eq!(
        csv,
        "User,Task,Subtask,Ticket,Date,Hours,Notes\nann@example.com,Backend,,,2025-03-03,01:00,ok\n"
    );
}

#[test]
fn test_csv_empty_export_keeps_header() {
    let csv = time_entries_to_string(&[], false).unwrap();
    assert_eq!(csv, "User,Project,Task,Subtask,Ticket,Date,Hours,Notes\n");
}

#[test]
fn test_parse_range_forms() {
    assert_eq!(parse_range("2025").unwrap(), (d("2025-01-01"), d("2025-12-31")));
    assert_eq!(parse_range("2024-02").unwrap(), (d("2024-02-01"), d("2024-02-29")));
    assert_eq!(parse_range("2025-03-04").unwrap(), (d("2025-03-04"), d("2025-03-04")));
    assert_eq!(
        parse_range("2025-01:2025-03").unwrap(),
        (d("2025-01-01"), d("2025-03-31"))
    );
    assert_eq!(
        parse_range("2025-03-01:2025-03-15").unwrap(),
        (d("2025-03-01"), d("2025-03-15"))
    );
}

#[test]
fn test_parse_range_errors() {
    for bad in ["2025-13", "25", "2025-03:2025", "2025-03-10:2025-03-01", "2025/03"] {
        let err = parse_range(bad).unwrap_err();
        assert!(matches!(err, AppError::InvalidDate(_)), "{bad}: {err}");
    }
}

#[test]
fn test_export_hours_scoped_to_actor() {
    let pool = seeded_pool();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out").join("hours.csv");

    let out = ExportLogic::export(&pool, &ann(), &options(file.clone())).unwrap();
    assert!(out.success);
    assert_eq!(out.data, Some(1));

    let content = fs::read_to_string(&file).unwrap();
    assert!(content.contains("Apollo"));
    assert!(!content.contains("Gemini"));
    assert!(content.contains("OPS-12"));

    let denied = ExportLogic::export(
        &pool,
        &ann(),
        &ExportOptions {
            user: Some(BOB.into()),
            force: true,
            ..options(file.clone())
        },
    )
    .unwrap();
    assert_eq!(denied.kind, Some(FailureKind::Unauthorized));
}

#[test]
fn test_export_refuses_to_overwrite_without_force() {
    let pool = seeded_pool();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("hours.json");
    fs::write(&file, "keep me").unwrap();

    let opts = ExportOptions {
        format: ExportFormat::Json,
        ..options(file.clone())
    };
    let err = ExportLogic::export(&pool, &boss(), &opts).unwrap_err();
    assert!(matches!(err, AppError::Export(_)));
    assert_eq!(fs::read_to_string(&file).unwrap(), "keep me");

    let forced = ExportOptions { force: true, ..opts };
    let out = ExportLogic::export(&pool, &boss(), &forced).unwrap();
    assert_eq!(out.data, Some(2));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    assert_eq!(json[0]["Project"], "Apollo");
}

#[test]
fn test_export_toil_with_range() {
    let pool = memory_pool();
    seed_entry(&pool, ANN, "2025-02-28", "01:00", "00:00", EntryStatus::Approved);
    seed_entry(&pool, ANN, "2025-03-03", "02:00", "00:00", EntryStatus::Draft);
    seed_entry(&pool, BOB, "2025-03-04", "03:00", "00:00", EntryStatus::Pending);

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("toil.csv");
    let opts = ExportOptions {
        data: ExportData::Toil,
        range: Some("2025-03".into()),
        ..options(file.clone())
    };
    let out = ExportLogic::export(&pool, &boss(), &opts).unwrap();
    assert_eq!(out.data, Some(2));

    let content = fs::read_to_string(&file).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines[0], "User,Date,Week,Requested,Used,Status,Comments");
    assert_eq!(lines[1], "ann@example.com,2025-03-03,2025-03-03,02:00,00:00,draft,");
    assert_eq!(lines[2], "bob@example.com,2025-03-04,2025-03-03,03:00,00:00,pending,");

    let bad = ExportOptions {
        range: Some("2025-99".into()),
        force: true,
        ..opts
    };
    assert_eq!(
        ExportLogic::export(&pool, &boss(), &bad).unwrap().kind,
        Some(FailureKind::Validation)
    );
}
