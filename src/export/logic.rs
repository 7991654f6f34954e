// src/export/logic.rs

use crate::db::pool::DbPool;
use crate::db::timesheet::{TimeEntryFilter, list_time_entries};
use crate::db::toil::list_all_entries_between;
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::range::parse_range;
use crate::export::{ExportData, ExportFormat, csv, json, notify_export_success};
use crate::models::actor::{Actor, user_key};
use crate::models::outcome::{Outcome, Rejection};
use crate::ui::messages::{info, warning};
use chrono::NaiveDate;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub data: ExportData,
    pub format: ExportFormat,
    pub file: PathBuf,
    /// `None`, `"all"` or a range expression understood by [`parse_range`].
    pub range: Option<String>,
    pub user: Option<String>,
    pub project: Option<String>,
    pub task: Option<String>,
    /// Drop the project column (hours only).
    pub by_task: bool,
    pub force: bool,
}

/// Widest range stored as `YYYY-MM-DD` text.
fn all_dates() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

/// High-level export logic.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the selected rows to `opts.file`; returns the number of rows.
    ///
    /// Non-administrators can only export their own data.
    pub fn export(pool: &DbPool, actor: &Actor, opts: &ExportOptions) -> AppResult<Outcome<usize>> {
        let user = match opts.user.as_deref().map(user_key) {
            Some(u) if !actor.can_act_for(&u) => {
                return Ok(Rejection::unauthorized(format!(
                    "Not authorized: {} cannot export data of {u}.",
                    actor.id
                ))
                .into());
            }
            Some(u) => Some(u),
            None if actor.is_admin => None,
            None => Some(user_key(&actor.id)),
        };

        let bounds: Option<(NaiveDate, NaiveDate)> = match opts.range.as_deref() {
            None => None,
            Some(r) if r.eq_ignore_ascii_case("all") => None,
            Some(r) => match parse_range(r) {
                Ok(b) => Some(b),
                Err(e) => return Ok(Rejection::validation(e.to_string()).into()),
            },
        };

        ensure_writable(&opts.file, opts.force)?;
        info(format!(
            "Exporting {} to {}: {}",
            match opts.data {
                ExportData::Hours => "hours",
                ExportData::Toil => "TOIL entries",
            },
            opts.format.as_str().to_uppercase(),
            opts.file.display()
        ));

        let rows = match opts.data {
            ExportData::Hours => {
                let filter = TimeEntryFilter {
                    user_id: user,
                    from: bounds.map(|(f, _)| f),
                    to: bounds.map(|(_, t)| t),
                    project: opts.project.clone(),
                    task: opts.task.clone(),
                };
                let entries = pool.run(|conn| list_time_entries(conn, &filter))?;
                let out = BufWriter::new(File::create(&opts.file)?);
                match opts.format {
                    ExportFormat::Csv => csv::write_time_entries(out, &entries, opts.by_task)?,
                    ExportFormat::Json => json::write_time_entries(out, &entries, opts.by_task)?,
                }
                entries.len()
            }
            ExportData::Toil => {
                let (from, to) = bounds.unwrap_or_else(all_dates);
                let entries: Vec<_> = pool
                    .run(|conn| list_all_entries_between(conn, &from, &to))?
                    .into_iter()
                    .filter(|e| user.as_deref().is_none_or(|u| e.user_id == u))
                    .collect();
                let out = BufWriter::new(File::create(&opts.file)?);
                match opts.format {
                    ExportFormat::Csv => csv::write_toil_entries(out, &entries)?,
                    ExportFormat::Json => json::write_toil_entries(out, &entries)?,
                }
                entries.len()
            }
        };

        if rows == 0 {
            warning("No rows found for the selected filters.");
        }
        notify_export_success(&opts.format.as_str().to_uppercase(), rows, &opts.file);
        Ok(Outcome::ok(rows, format!("Exported {rows} row(s).")))
    }
}
