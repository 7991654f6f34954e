//! TOIL weekly submissions.

use crate::db::{date_col, now_rfc3339, submission_status_col};
use crate::errors::{AppError, AppResult};
use crate::models::status::SubmissionStatus;
use crate::models::toil_submission::ToilSubmission;
use crate::utils::date::{format_date, week_end};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};

const SUBMISSION_COLUMNS: &str = "id, user_id, week_start, week_end, status, submitted_at, \
     approved_by, approved_at, comments";

fn map_submission(row: &Row) -> rusqlite::Result<ToilSubmission> {
    Ok(ToilSubmission {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        week_start: date_col(row, "week_start")?,
        week_end: date_col(row, "week_end")?,
        status: submission_status_col(row, "status")?,
        submitted_at: row.get("submitted_at")?,
        approved_by: row.get("approved_by")?,
        approved_at: row.get("approved_at")?,
        comments: row.get("comments")?,
    })
}

pub fn find_submission(conn: &Connection, id: i64) -> AppResult<Option<ToilSubmission>> {
    let sql = format!("SELECT {SUBMISSION_COLUMNS} FROM toil_submissions WHERE id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt.query_row([id], map_submission).optional()?)
}

pub fn find_submission_by_week(
    conn: &Connection,
    user_id: &str,
    week_start: &NaiveDate,
) -> AppResult<Option<ToilSubmission>> {
    let sql = format!(
        "SELECT {SUBMISSION_COLUMNS} FROM toil_submissions WHERE user_id = ?1 AND week_start = ?2"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![user_id, format_date(week_start)], map_submission)
        .optional()?)
}

/// Create the week's submission as `pending`, or reopen an existing row in
/// place (reviewer fields cleared).
pub fn upsert_pending_submission(
    conn: &Connection,
    user_id: &str,
    week_start: &NaiveDate,
) -> AppResult<ToilSubmission> {
    conn.execute(
        "INSERT INTO toil_submissions (user_id, week_start, week_end, status, submitted_at)
         VALUES (?1, ?2, ?3, 'pending', ?4)
         ON CONFLICT(user_id, week_start) DO UPDATE SET
            status       = 'pending',
            submitted_at = excluded.submitted_at,
            approved_by  = NULL,
            approved_at  = NULL,
            comments     = NULL",
        params![
            user_id,
            format_date(week_start),
            format_date(&week_end(*week_start)),
            now_rfc3339()
        ],
    )?;

    find_submission_by_week(conn, user_id, week_start)?.ok_or_else(|| {
        AppError::Other(format!(
            "submission for {user_id} week {week_start} vanished after upsert"
        ))
    })
}

/// Resolve a submission: set status and stamp the reviewer.
pub fn update_submission_status(
    conn: &Connection,
    id: i64,
    status: SubmissionStatus,
    reviewer: &str,
    comments: Option<&str>,
) -> AppResult<Option<ToilSubmission>> {
    conn.execute(
        "UPDATE toil_submissions
            SET status = ?1, approved_by = ?2, approved_at = ?3, comments = ?4
          WHERE id = ?5",
        params![status.to_db_str(), reviewer, now_rfc3339(), comments, id],
    )?;
    find_submission(conn, id)
}

pub fn delete_submission(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM toil_submissions WHERE id = ?1", [id])? > 0)
}

pub fn list_submissions(
    conn: &Connection,
    user_id: Option<&str>,
    status: Option<SubmissionStatus>,
) -> AppResult<Vec<ToilSubmission>> {
    let mut sql = format!("SELECT {SUBMISSION_COLUMNS} FROM toil_submissions");
    let mut conditions = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();

    if let Some(u) = &user_id {
        conditions.push(format!("user_id = ?{}", values.len() + 1));
        values.push(u);
    }
    let status_str = status.map(|s| s.to_db_str());
    if let Some(s) = &status_str {
        conditions.push(format!("status = ?{}", values.len() + 1));
        values.push(s);
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY week_start DESC, user_id ASC");

    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(values.as_slice(), map_submission)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
