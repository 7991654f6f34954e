//! Time entries, timesheet submissions and the rejection archive.

use crate::core::workflow::RejectionArchive;
use crate::db::pool::DbPool;
use crate::db::{date_col, now_rfc3339, submission_status_col};
use crate::errors::{AppError, AppResult};
use crate::models::status::SubmissionStatus;
use crate::models::timesheet::{NewTimeEntry, TimeEntry, TimesheetRejection, TimesheetSubmission};
use crate::utils::date::format_date;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, Transaction, params};

// ---------------------------
// Time entries
// ---------------------------

const TIME_ENTRY_COLUMNS: &str =
    "id, user_id, project, task, subtask, ticket, date, hours, notes, created_at";

fn map_time_entry(row: &Row) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        project: row.get("project")?,
        task: row.get("task")?,
        subtask: row.get("subtask")?,
        ticket: row.get("ticket")?,
        date: date_col(row, "date")?,
        hours: row.get("hours")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_time_entry(conn: &Connection, entry: &NewTimeEntry) -> AppResult<TimeEntry> {
    conn.execute(
        "INSERT INTO time_entries
            (user_id, project, task, subtask, ticket, date, hours, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.user_id,
            entry.project,
            entry.task,
            entry.subtask,
            entry.ticket,
            format_date(&entry.date),
            entry.hours,
            entry.notes,
            now_rfc3339()
        ],
    )?;
    let id = conn.last_insert_rowid();
    find_time_entry(conn, id)?
        .ok_or_else(|| AppError::Other(format!("time entry {id} vanished after insert")))
}

pub fn find_time_entry(conn: &Connection, id: i64) -> AppResult<Option<TimeEntry>> {
    let sql = format!("SELECT {TIME_ENTRY_COLUMNS} FROM time_entries WHERE id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row([id], map_time_entry).optional()?)
}

pub fn delete_time_entry(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM time_entries WHERE id = ?1", [id])? > 0)
}

/// Optional filters for time entry listings and exports.
#[derive(Debug, Clone, Default)]
pub struct TimeEntryFilter {
    pub user_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub project: Option<String>,
    pub task: Option<String>,
}

pub fn list_time_entries(conn: &Connection, filter: &TimeEntryFilter) -> AppResult<Vec<TimeEntry>> {
    let mut sql = format!("SELECT {TIME_ENTRY_COLUMNS} FROM time_entries");
    let mut conditions: Vec<String> = Vec::new();
    let mut owned: Vec<String> = Vec::new();

    let mut push = |column: &str, op: &str, value: String| {
        owned.push(value);
        conditions.push(format!("{column} {op} ?{}", owned.len()));
    };

    if let Some(u) = &filter.user_id {
        push("user_id", "=", u.clone());
    }
    if let Some(d) = &filter.from {
        push("date", ">=", format_date(d));
    }
    if let Some(d) = &filter.to {
        push("date", "<=", format_date(d));
    }
    if let Some(p) = &filter.project {
        push("project", "=", p.clone());
    }
    if let Some(t) = &filter.task {
        push("task", "=", t.clone());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY user_id ASC, date ASC, id ASC");

    let values: Vec<&dyn ToSql> = owned.iter().map(|s| s as &dyn ToSql).collect();
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(values.as_slice(), map_time_entry)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ---------------------------
// Timesheet submissions
// ---------------------------

const TIMESHEET_COLUMNS: &str = "id, user_id, start_date, end_date, status, submitted_at, \
     total_hours, approved_by, approved_at, comments";

fn map_timesheet(row: &Row) -> rusqlite::Result<TimesheetSubmission> {
    Ok(TimesheetSubmission {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        start_date: date_col(row, "start_date")?,
        end_date: date_col(row, "end_date")?,
        status: submission_status_col(row, "status")?,
        submitted_at: row.get("submitted_at")?,
        total_hours: row.get("total_hours")?,
        approved_by: row.get("approved_by")?,
        approved_at: row.get("approved_at")?,
        comments: row.get("comments")?,
    })
}

pub fn find_timesheet(conn: &Connection, id: i64) -> AppResult<Option<TimesheetSubmission>> {
    let sql = format!("SELECT {TIMESHEET_COLUMNS} FROM timesheet_submissions WHERE id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row([id], map_timesheet).optional()?)
}

/// First active timesheet of `user_id` whose range shares a day with `[start, end]`.
pub fn find_overlapping_timesheet(
    conn: &Connection,
    user_id: &str,
    start: &NaiveDate,
    end: &NaiveDate,
) -> AppResult<Option<TimesheetSubmission>> {
    let sql = format!(
        "SELECT {TIMESHEET_COLUMNS} FROM timesheet_submissions
         WHERE user_id = ?1 AND start_date <= ?3 AND end_date >= ?2
         ORDER BY start_date ASC
         LIMIT 1"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(
            params![user_id, format_date(start), format_date(end)],
            map_timesheet,
        )
        .optional()?)
}

pub fn insert_timesheet(
    conn: &Connection,
    user_id: &str,
    start: &NaiveDate,
    end: &NaiveDate,
    total_hours: &str,
) -> AppResult<TimesheetSubmission> {
    conn.execute(
        "INSERT INTO timesheet_submissions
            (user_id, start_date, end_date, status, submitted_at, total_hours)
         VALUES (?1, ?2, ?3, 'pending', ?4, ?5)",
        params![
            user_id,
            format_date(start),
            format_date(end),
            now_rfc3339(),
            total_hours
        ],
    )?;
    let id = conn.last_insert_rowid();
    find_timesheet(conn, id)?
        .ok_or_else(|| AppError::Other(format!("timesheet {id} vanished after insert")))
}

pub fn update_timesheet_status(
    conn: &Connection,
    id: i64,
    status: SubmissionStatus,
    reviewer: &str,
    comments: Option<&str>,
) -> AppResult<Option<TimesheetSubmission>> {
    conn.execute(
        "UPDATE timesheet_submissions
            SET status = ?1, approved_by = ?2, approved_at = ?3, comments = ?4
          WHERE id = ?5",
        params![status.to_db_str(), reviewer, now_rfc3339(), comments, id],
    )?;
    find_timesheet(conn, id)
}

pub fn list_timesheets(
    conn: &Connection,
    user_id: Option<&str>,
    status: Option<SubmissionStatus>,
) -> AppResult<Vec<TimesheetSubmission>> {
    let sql = format!(
        "SELECT {TIMESHEET_COLUMNS} FROM timesheet_submissions
         WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR status = ?2)
         ORDER BY start_date DESC, user_id ASC"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(
        params![user_id, status.map(|s| s.to_db_str())],
        map_timesheet,
    )?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

// ---------------------------
// Rejection archive
// ---------------------------

fn map_rejection(row: &Row) -> rusqlite::Result<TimesheetRejection> {
    Ok(TimesheetRejection {
        id: row.get("id")?,
        submission_id: row.get("submission_id")?,
        user_id: row.get("user_id")?,
        payload: row.get("payload")?,
        reason: row.get("reason")?,
        rejected_by: row.get("rejected_by")?,
        rejected_at: row.get("rejected_at")?,
    })
}

pub fn list_rejections(
    conn: &Connection,
    user_id: Option<&str>,
) -> AppResult<Vec<TimesheetRejection>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, submission_id, user_id, payload, reason, rejected_by, rejected_at
         FROM timesheet_rejections
         WHERE (?1 IS NULL OR user_id = ?1)
         ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], map_rejection)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl RejectionArchive<TimesheetSubmission> for DbPool {
    fn archive_rejection<F>(
        &mut self,
        item: &TimesheetSubmission,
        reason: &str,
        reviewer: &str,
        mut on_archived: F,
    ) -> AppResult<i64>
    where
        F: FnMut(&Transaction<'_>, i64) -> AppResult<()>,
    {
        let mut archived = item.clone();
        archived.status = SubmissionStatus::Rejected;
        archived.approved_by = Some(reviewer.to_string());
        archived.approved_at = Some(now_rfc3339());
        archived.comments = Some(reason.to_string());
        let payload = serde_json::to_string(&archived)?;

        self.transaction(|tx| {
            tx.execute(
                "INSERT INTO timesheet_rejections
                    (submission_id, user_id, payload, reason, rejected_by, rejected_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.id,
                    item.user_id,
                    payload,
                    reason,
                    reviewer,
                    now_rfc3339()
                ],
            )?;
            let archive_id = tx.last_insert_rowid();
            tx.execute(
                "DELETE FROM timesheet_submissions WHERE id = ?1",
                [item.id],
            )?;
            on_archived(tx, archive_id)?;
            Ok(archive_id)
        })
    }
}
