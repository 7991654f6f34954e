use crate::db::now_rfc3339;
use crate::errors::AppResult;
use crate::models::user::User;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        email: row.get("email")?,
        name: row.get("name")?,
        is_admin: row.get::<_, i64>("is_admin")? == 1,
        created_at: row.get("created_at")?,
    })
}

/// Insert a user, or update name and admin flag of an existing one.
pub fn upsert_user(conn: &Connection, email: &str, name: &str, is_admin: bool) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (email, name, is_admin, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(email) DO UPDATE SET name = excluded.name, is_admin = excluded.is_admin",
        params![email, name, i64::from(is_admin), now_rfc3339()],
    )?;
    Ok(())
}

pub fn find_user(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT email, name, is_admin, created_at FROM users WHERE email = ?1 COLLATE NOCASE",
    )?;
    Ok(stmt.query_row([email], map_user).optional()?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt =
        conn.prepare_cached("SELECT email, name, is_admin, created_at FROM users ORDER BY email")?;
    let rows = stmt.query_map([], map_user)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
