//! TOIL entries, balances and settings.

use crate::db::{date_col, entry_status_col, now_rfc3339};
use crate::errors::{AppError, AppResult};
use crate::models::status::EntryStatus;
use crate::models::toil_entry::{EntryDraft, ToilEntry};
use crate::models::toil_settings::ToilSettings;
use crate::utils::date::format_date;
use crate::utils::time::format_duration;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

const ENTRY_COLUMNS: &str = "id, user_id, date, requested_hours, used_hours, status, \
     comments, admin_comments, week_start, created_at, updated_at";

pub fn map_entry(row: &Row) -> rusqlite::Result<ToilEntry> {
    Ok(ToilEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: date_col(row, "date")?,
        requested_hours: row.get("requested_hours")?,
        used_hours: row.get("used_hours")?,
        status: entry_status_col(row, "status")?,
        comments: row.get("comments")?,
        admin_comments: row.get("admin_comments")?,
        week_start: date_col(row, "week_start")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn query_entries<P: rusqlite::Params>(
    conn: &Connection,
    where_clause: &str,
    params: P,
) -> AppResult<Vec<ToilEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM toil_entries WHERE {where_clause} ORDER BY date ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params, map_entry)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ---------------------------
// Entries
// ---------------------------

pub fn find_entry(conn: &Connection, id: i64) -> AppResult<Option<ToilEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM toil_entries WHERE id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row([id], map_entry).optional()?)
}

pub fn find_entry_by_date(
    conn: &Connection,
    user_id: &str,
    date: &NaiveDate,
) -> AppResult<Option<ToilEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM toil_entries WHERE user_id = ?1 AND date = ?2");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![user_id, format_date(date)], map_entry)
        .optional()?)
}

/// Entries of `user_id` with `from <= date <= to`.
pub fn list_entries_between(
    conn: &Connection,
    user_id: &str,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<ToilEntry>> {
    query_entries(
        conn,
        "user_id = ?1 AND date >= ?2 AND date <= ?3",
        params![user_id, format_date(from), format_date(to)],
    )
}

pub fn list_entries(conn: &Connection, user_id: &str) -> AppResult<Vec<ToilEntry>> {
    query_entries(conn, "user_id = ?1", [user_id])
}

pub fn list_entries_with_status(
    conn: &Connection,
    user_id: &str,
    status: EntryStatus,
) -> AppResult<Vec<ToilEntry>> {
    query_entries(
        conn,
        "user_id = ?1 AND status = ?2",
        params![user_id, status.to_db_str()],
    )
}

pub fn list_approved_entries(conn: &Connection, user_id: &str) -> AppResult<Vec<ToilEntry>> {
    list_entries_with_status(conn, user_id, EntryStatus::Approved)
}

pub fn list_week_entries(
    conn: &Connection,
    user_id: &str,
    week_start: &NaiveDate,
) -> AppResult<Vec<ToilEntry>> {
    query_entries(
        conn,
        "user_id = ?1 AND week_start = ?2",
        params![user_id, format_date(week_start)],
    )
}

/// Insert or update the entry for `(user_id, date)`.
///
/// On conflict the hours and comments are replaced; the stored status is kept.
pub fn upsert_entry(conn: &Connection, draft: &EntryDraft) -> AppResult<ToilEntry> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO toil_entries
            (user_id, date, requested_hours, used_hours, status, comments, week_start, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
         ON CONFLICT(user_id, date) DO UPDATE SET
            requested_hours = excluded.requested_hours,
            used_hours      = excluded.used_hours,
            comments        = excluded.comments,
            updated_at      = excluded.updated_at",
        params![
            draft.user_id,
            format_date(&draft.date),
            draft.requested_hours,
            draft.used_hours,
            draft.initial_status.to_db_str(),
            draft.comments,
            format_date(&draft.week_start),
            now,
        ],
    )?;

    find_entry_by_date(conn, &draft.user_id, &draft.date)?.ok_or_else(|| {
        AppError::Other(format!(
            "entry for {} on {} vanished after upsert",
            draft.user_id, draft.date
        ))
    })
}

/// Returns `true` when a row was removed.
pub fn delete_entry(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM toil_entries WHERE id = ?1", [id])? > 0)
}

/// Stamp every entry of a week with `status`.
pub fn set_week_status(
    conn: &Connection,
    user_id: &str,
    week_start: &NaiveDate,
    status: EntryStatus,
    admin_comments: Option<&str>,
) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE toil_entries
            SET status = ?1,
                admin_comments = COALESCE(?2, admin_comments),
                updated_at = ?3
          WHERE user_id = ?4 AND week_start = ?5",
        params![
            status.to_db_str(),
            admin_comments,
            now_rfc3339(),
            user_id,
            format_date(week_start)
        ],
    )?)
}

/// Users owning at least one entry or a stored balance.
pub fn list_toil_users(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id FROM toil_entries
         UNION
         SELECT user_id FROM toil_balances
         ORDER BY user_id",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Entries of every user in `[from, to]`, for exports.
pub fn list_all_entries_between(
    conn: &Connection,
    from: &NaiveDate,
    to: &NaiveDate,
) -> AppResult<Vec<ToilEntry>> {
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM toil_entries
         WHERE date >= ?1 AND date <= ?2
         ORDER BY user_id ASC, date ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![format_date(from), format_date(to)], map_entry)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ---------------------------
// Balances
// ---------------------------

pub fn save_balance(conn: &Connection, user_id: &str, minutes: i64) -> AppResult<()> {
    conn.execute(
        "INSERT INTO toil_balances (user_id, total_hours, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET
            total_hours = excluded.total_hours,
            updated_at  = excluded.updated_at",
        params![user_id, format_duration(minutes), now_rfc3339()],
    )?;
    Ok(())
}

/// Stored `(total_hours, updated_at)` for `user_id`.
pub fn load_balance(conn: &Connection, user_id: &str) -> AppResult<Option<(String, String)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT total_hours, updated_at FROM toil_balances WHERE user_id = ?1",
    )?;
    Ok(stmt
        .query_row([user_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .optional()?)
}

// ---------------------------
// Settings
// ---------------------------

fn map_settings(row: &Row) -> rusqlite::Result<ToilSettings> {
    Ok(ToilSettings {
        user_id: row.get("user_id")?,
        max_capacity: row.get("max_capacity")?,
        max_streak_hours: row.get("max_streak_hours")?,
        max_streak_days: row.get("max_streak_days")?,
    })
}

pub fn find_settings(conn: &Connection, user_id: &str) -> AppResult<Option<ToilSettings>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, max_capacity, max_streak_hours, max_streak_days
         FROM toil_settings WHERE user_id = ?1",
    )?;
    Ok(stmt.query_row([user_id], map_settings).optional()?)
}

/// Return the settings row, creating it from `defaults` when absent.
pub fn get_or_create_settings(
    conn: &Connection,
    user_id: &str,
    defaults: &ToilSettings,
) -> AppResult<ToilSettings> {
    conn.execute(
        "INSERT OR IGNORE INTO toil_settings
            (user_id, max_capacity, max_streak_hours, max_streak_days, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            defaults.max_capacity,
            defaults.max_streak_hours,
            defaults.max_streak_days,
            now_rfc3339()
        ],
    )?;

    find_settings(conn, user_id)?.ok_or_else(|| {
        AppError::Other(format!("settings for {user_id} vanished after insert"))
    })
}

pub fn save_settings(conn: &Connection, settings: &ToilSettings) -> AppResult<()> {
    conn.execute(
        "INSERT INTO toil_settings
            (user_id, max_capacity, max_streak_hours, max_streak_days, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
            max_capacity     = excluded.max_capacity,
            max_streak_hours = excluded.max_streak_hours,
            max_streak_days  = excluded.max_streak_days,
            updated_at       = excluded.updated_at",
        params![
            settings.user_id,
            settings.max_capacity,
            settings.max_streak_hours,
            settings.max_streak_days,
            now_rfc3339()
        ],
    )?;
    Ok(())
}
