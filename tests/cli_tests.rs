mod common;

use common::{ANN, BOB, BOSS, init_db_with_users, setup_test_db, temp_out, tl};
use predicates::str::contains;
use std::fs;

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");

    tl().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(fs::metadata(&db_path).is_ok());

    // a second run applies nothing new
    tl().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("0 migration(s) applied"));
}

#[test]
fn test_user_registration_is_admin_only_once_bootstrapped() {
    let db_path = setup_test_db("cli_users");
    init_db_with_users(&db_path);

    tl().args(["--db", &db_path, "--as", BOSS, "user", "list"])
        .assert()
        .success()
        .stdout(contains(ANN))
        .stdout(contains("admin"));

    tl().args(["--db", &db_path, "--as", ANN, "user", "add", "eve@example.com"])
        .assert()
        .code(2)
        .stderr(contains("Not authorized"));
}

#[test]
fn test_toil_week_is_submitted_and_approved() {
    let db_path = setup_test_db("cli_toil_flow");
    init_db_with_users(&db_path);

    tl().args([
        "--db", &db_path, "--as", ANN, "toil", "add", "2025-03-03", "--earned", "08:00",
        "--comment", "release night",
    ])
    .assert()
    .success()
    .stdout(contains("TOIL entry saved"))
    .stdout(contains("release night"));

    tl().args(["--db", &db_path, "--as", ANN, "toil", "balance", "--json"])
        .assert()
        .success()
        .stdout(contains("\"total_hours\": \"00:00\""))
        .stdout(contains("\"pending_hours\": \"08:00\""));

    tl().args(["--db", &db_path, "--as", ANN, "toil", "submit", "--week", "2025-03-05"])
        .assert()
        .success()
        .stdout(contains("Week of 2025-03-03 submitted"));

    tl().args(["--db", &db_path, "--as", ANN, "toil", "approve", "1"])
        .assert()
        .code(2)
        .stderr(contains("only administrators"));

    tl().args(["--db", &db_path, "--as", BOSS, "toil", "submissions", "--status", "pending"])
        .assert()
        .success()
        .stdout(contains(ANN));

    tl().args(["--db", &db_path, "--as", BOSS, "toil", "approve", "1", "--comment", "ok"])
        .assert()
        .success()
        .stdout(contains("Submission 1 approved"));

    tl().args(["--db", &db_path, "--as", BOSS, "toil", "approve", "1"])
        .assert()
        .code(2)
        .stderr(contains("already approved"));

    tl().args(["--db", &db_path, "--as", ANN, "toil", "balance", "--json"])
        .assert()
        .success()
        .stdout(contains("\"total_hours\": \"08:00\""));

    tl().args([
        "--db", &db_path, "--as", ANN, "toil", "add", "2025-03-04", "--earned", "02:00",
    ])
    .assert()
    .code(2)
    .stderr(contains("already approved"));

    tl().args(["--db", &db_path, "--as", BOSS, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("toil_add"))
        .stdout(contains("toil_approve"));
}

#[test]
fn test_capacity_limit_from_settings() {
    let db_path = setup_test_db("cli_capacity");
    init_db_with_users(&db_path);

    tl().args([
        "--db", &db_path, "--as", ANN, "toil", "settings", "--max-capacity", "01:00",
    ])
    .assert()
    .code(2)
    .stderr(contains("only administrators"));

    tl().args([
        "--db", &db_path, "--as", BOSS, "toil", "settings", "--user", ANN, "--max-capacity",
        "1:00",
    ])
    .assert()
    .success()
    .stdout(contains("max capacity     : 01:00"));

    tl().args([
        "--db", &db_path, "--as", ANN, "toil", "add", "2025-03-03", "--earned", "02:00",
    ])
    .assert()
    .code(2)
    .stderr(contains("only 01:00 remaining"));

    tl().args(["--db", &db_path, "--as", ANN, "toil", "list", "--period", "2025-03"])
        .assert()
        .success()
        .stdout(contains("No TOIL entries found"));
}

#[test]
fn test_streak_limit_from_cli() {
    let db_path = setup_test_db("cli_streak");
    init_db_with_users(&db_path);

    tl().args(["--db", &db_path, "--as", BOB, "toil", "add", "2025-03-10", "--used", "10:00"])
        .assert()
        .success();

    tl().args(["--db", &db_path, "--as", BOB, "toil", "add", "2025-03-11", "--used", "07:00"])
        .assert()
        .code(2)
        .stderr(contains("only 06:00 can be used"));
}

#[test]
fn test_timesheet_rejection_notifies_owner() {
    let db_path = setup_test_db("cli_timesheet");
    init_db_with_users(&db_path);

    for (date, hours) in [("2025-03-03", "07:30"), ("2025-03-04", "05:00")] {
        tl().args([
            "--db", &db_path, "--as", ANN, "hours", "add", date, "--project", "Apollo",
            "--task", "Backend", "--hours", hours,
        ])
        .assert()
        .success();
    }

    tl().args([
        "--db", &db_path, "--as", ANN, "timesheet", "submit", "--from", "2025-03-03", "--to",
        "2025-03-09",
    ])
    .assert()
    .success()
    .stdout(contains("12:30"));

    tl().args(["--db", &db_path, "--as", BOSS, "timesheet", "reject", "1"])
        .assert()
        .code(2)
        .stderr(contains("comment explaining the rejection"));

    tl().args([
        "--db", &db_path, "--as", BOSS, "timesheet", "reject", "1", "--reason",
        "missing tickets",
    ])
    .assert()
    .success()
    .stdout(contains("rejected and archived"));

    tl().args(["--db", &db_path, "--as", ANN, "notifications", "--unread", "--mark-read"])
        .assert()
        .success()
        .stdout(contains("missing tickets"));

    tl().args(["--db", &db_path, "--as", ANN, "notifications", "--unread"])
        .assert()
        .success()
        .stdout(contains("No notifications"));

    tl().args(["--db", &db_path, "--as", BOSS, "timesheet", "list"])
        .assert()
        .success()
        .stdout(contains("No timesheets found"));
}

#[test]
fn test_export_hours_csv() {
    let db_path = setup_test_db("cli_export");
    let out = temp_out("cli_export", "csv");
    init_db_with_users(&db_path);

    tl().args([
        "--db", &db_path, "--as", ANN, "hours", "add", "2025-03-03", "--project", "Apollo, Ltd",
        "--task", "Backend", "--hours", "02:00", "--notes", "fix \"login\"",
    ])
    .assert()
    .success();

    tl().args([
        "--db", &db_path, "--as", ANN, "export", "--file", &out, "--range", "2025-03",
    ])
    .assert()
    .success()
    .stdout(contains("export completed (1 rows)"));

    let content = fs::read_to_string(&out).expect("export file");
    assert!(content.starts_with("User,Project,Task,Subtask,Ticket,Date,Hours,Notes\n"));
    assert!(content.contains("\"Apollo, Ltd\""));
    assert!(content.contains("\"fix \"\"login\"\"\""));

    tl().args(["--db", &db_path, "--as", ANN, "export", "--file", &out])
        .assert()
        .code(1)
        .stderr(contains("--force"));

    tl().args([
        "--db", &db_path, "--as", ANN, "export", "--file", &out, "--format", "json", "--force",
    ])
    .assert()
    .success();
    assert!(fs::read_to_string(&out).unwrap().trim_start().starts_with('['));
}

#[test]
fn test_errors_exit_with_code_one() {
    let db_path = setup_test_db("cli_errors");
    init_db_with_users(&db_path);

    tl().args(["--db", &db_path, "--as", ANN, "toil", "add", "2025-02-30", "--earned", "01:00"])
        .assert()
        .code(1)
        .stderr(contains("Invalid date"));

    tl().args(["--db", &db_path, "--as", ANN, "toil", "submissions", "--status", "maybe"])
        .assert()
        .code(1)
        .stderr(contains("Invalid status"));
}
