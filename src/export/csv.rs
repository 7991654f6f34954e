//! CSV writers. Fields containing a comma, quote or newline are quoted and
//! inner quotes doubled; everything else is written bare.

use crate::errors::AppResult;
use crate::export::model::{TaskEntryRow, TimeEntryRow, ToilEntryRow};
use crate::models::timesheet::TimeEntry;
use crate::models::toil_entry::ToilEntry;
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::io::Write;

pub const TIME_ENTRY_HEADER: [&str; 8] = [
    "User", "Project", "Task", "Subtask", "Ticket", "Date", "Hours", "Notes",
];
pub const TASK_ENTRY_HEADER: [&str; 7] =
    ["User", "Task", "Subtask", "Ticket", "Date", "Hours", "Notes"];
pub const TOIL_ENTRY_HEADER: [&str; 7] = [
    "User", "Date", "Week", "Requested", "Used", "Status", "Comments",
];

fn write_rows<W: Write, R: Serialize>(out: W, header: &[&str], rows: &[R]) -> AppResult<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .has_headers(false)
        .from_writer(out);

    // Written explicitly so an empty export still carries its header.
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Time entries; `task_scoped` drops the `Project` column.
pub fn write_time_entries<W: Write>(
    out: W,
    entries: &[TimeEntry],
    task_scoped: bool,
) -> AppResult<()> {
    if task_scoped {
        let rows: Vec<TaskEntryRow> = entries.iter().map(TaskEntryRow::from).collect();
        write_rows(out, &TASK_ENTRY_HEADER, &rows)
    } else {
        let rows: Vec<TimeEntryRow> = entries.iter().map(TimeEntryRow::from).collect();
        write_rows(out, &TIME_ENTRY_HEADER, &rows)
    }
}

pub fn write_toil_entries<W: Write>(out: W, entries: &[ToilEntry]) -> AppResult<()> {
    let rows: Vec<ToilEntryRow> = entries.iter().map(ToilEntryRow::from).collect();
    write_rows(out, &TOIL_ENTRY_HEADER, &rows)
}

/// Time entries rendered to a string.
pub fn time_entries_to_string(entries: &[TimeEntry], task_scoped: bool) -> AppResult<String> {
    let mut buf = Vec::new();
    write_time_entries(&mut buf, entries, task_scoped)?;
    String::from_utf8(buf).map_err(|e| crate::errors::AppError::Export(e.to_string()))
}
