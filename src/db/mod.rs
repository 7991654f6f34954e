pub mod initialize;
pub mod log;
pub mod migrate;
pub mod notifications;
pub mod pool;
pub mod submissions;
pub mod timesheet;
pub mod toil;
pub mod users;

use crate::errors::AppError;
use crate::models::status::{EntryStatus, SubmissionStatus};
use crate::utils::date::DATE_FMT;
use chrono::NaiveDate;
use rusqlite::Row;
use rusqlite::types::Type;

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Read a `YYYY-MM-DD` TEXT column.
pub(crate) fn date_col(row: &Row, name: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(name)?;
    let idx = row.as_ref().column_index(name)?;
    NaiveDate::parse_from_str(&raw, DATE_FMT).map_err(|_| conversion_error(idx, AppError::InvalidDate(raw)))
}

pub(crate) fn entry_status_col(row: &Row, name: &str) -> rusqlite::Result<EntryStatus> {
    let raw: String = row.get(name)?;
    let idx = row.as_ref().column_index(name)?;
    EntryStatus::from_db_str(&raw).ok_or_else(|| conversion_error(idx, AppError::InvalidStatus(raw)))
}

pub(crate) fn submission_status_col(row: &Row, name: &str) -> rusqlite::Result<SubmissionStatus> {
    let raw: String = row.get(name)?;
    let idx = row.as_ref().column_index(name)?;
    SubmissionStatus::from_db_str(&raw)
        .ok_or_else(|| conversion_error(idx, AppError::InvalidStatus(raw)))
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}
