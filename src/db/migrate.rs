//! Versioned schema migrations.
//!
//! Applied versions are recorded in the `log` table as
//! `operation = 'migration_applied'`, `target = <version>`.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_users_and_toil",
        description: "Created users and TOIL tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            email       TEXT PRIMARY KEY,
            name        TEXT NOT NULL DEFAULT '',
            is_admin    INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS toil_entries (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id          TEXT NOT NULL,
            date             TEXT NOT NULL,          -- YYYY-MM-DD
            requested_hours  TEXT NOT NULL DEFAULT '00:00',
            used_hours       TEXT NOT NULL DEFAULT '00:00',
            status           TEXT NOT NULL DEFAULT 'draft'
                             CHECK (status IN ('draft','pending','approved','rejected')),
            comments         TEXT,
            admin_comments   TEXT,
            week_start       TEXT NOT NULL,          -- Monday of the ISO week
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            UNIQUE (user_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_toil_entries_user_week ON toil_entries(user_id, week_start);
        CREATE INDEX IF NOT EXISTS idx_toil_entries_user_status ON toil_entries(user_id, status);

        CREATE TABLE IF NOT EXISTS toil_balances (
            user_id      TEXT PRIMARY KEY,
            total_hours  TEXT NOT NULL DEFAULT '00:00',
            updated_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS toil_settings (
            user_id           TEXT PRIMARY KEY,
            max_capacity      TEXT NOT NULL,
            max_streak_hours  TEXT NOT NULL,
            max_streak_days   INTEGER NOT NULL,
            updated_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS toil_submissions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT NOT NULL,
            week_start    TEXT NOT NULL,
            week_end      TEXT NOT NULL,
            status        TEXT NOT NULL CHECK (status IN ('pending','approved','rejected')),
            submitted_at  TEXT NOT NULL,
            approved_by   TEXT,
            approved_at   TEXT,
            comments      TEXT,
            UNIQUE (user_id, week_start)
        );
        "#,
    },
    Migration {
        version: "20250301_0002_timesheets",
        description: "Created time entry, timesheet and notification tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS time_entries (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL,
            project     TEXT NOT NULL,
            task        TEXT NOT NULL,
            subtask     TEXT,
            ticket      TEXT,
            date        TEXT NOT NULL,
            hours       TEXT NOT NULL,
            notes       TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_time_entries_user_date ON time_entries(user_id, date);

        CREATE TABLE IF NOT EXISTS timesheet_submissions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT NOT NULL,
            start_date    TEXT NOT NULL,
            end_date      TEXT NOT NULL,
            status        TEXT NOT NULL CHECK (status IN ('pending','approved','rejected')),
            submitted_at  TEXT NOT NULL,
            total_hours   TEXT NOT NULL,
            approved_by   TEXT,
            approved_at   TEXT,
            comments      TEXT,
            UNIQUE (user_id, start_date, end_date)
        );

        CREATE TABLE IF NOT EXISTS timesheet_rejections (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id  INTEGER NOT NULL,
            user_id        TEXT NOT NULL,
            payload        TEXT NOT NULL,
            reason         TEXT NOT NULL,
            rejected_by    TEXT NOT NULL,
            rejected_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL,
            message     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            read        INTEGER NOT NULL DEFAULT 0
        );
        "#,
    },
];

/// Ensure that the `log` table exists; migration bookkeeping lives there.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM log
             WHERE operation = 'migration_applied' AND target = ?1
             LIMIT 1",
            [version],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        params![m.version, m.description],
    )?;

    tx.commit()?;
    info!(version = m.version, "migration applied");
    Ok(())
}

/// Versions not yet applied to this database.
pub fn pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;
    let mut out = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            out.push(m.version);
        }
    }
    Ok(out)
}

/// Public entry point: run all pending migrations, returning how many ran.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied += 1;
    }

    Ok(applied)
}
