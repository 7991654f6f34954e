use crate::db::now_rfc3339;
use crate::errors::AppResult;
use crate::models::notification::Notification;
use rusqlite::{Connection, Row, params};

fn map_notification(row: &Row) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        message: row.get("message")?,
        created_at: row.get("created_at")?,
        read: row.get::<_, i64>("read")? == 1,
    })
}

pub fn insert_notification(conn: &Connection, user_id: &str, message: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO notifications (user_id, message, created_at) VALUES (?1, ?2, ?3)",
        params![user_id, message, now_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_notifications(
    conn: &Connection,
    user_id: &str,
    unread_only: bool,
) -> AppResult<Vec<Notification>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, message, created_at, read FROM notifications
         WHERE user_id = ?1 AND (?2 = 0 OR read = 0)
         ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![user_id, i64::from(unread_only)], map_notification)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn mark_all_read(conn: &Connection, user_id: &str) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0",
        [user_id],
    )?)
}
