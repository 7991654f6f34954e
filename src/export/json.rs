use crate::errors::AppResult;
use crate::export::model::{TaskEntryRow, TimeEntryRow, ToilEntryRow};
use crate::models::timesheet::TimeEntry;
use crate::models::toil_entry::ToilEntry;
use std::io::Write;

/// Pretty-printed JSON array, same fields as the CSV columns.
pub fn write_time_entries<W: Write>(
    mut out: W,
    entries: &[TimeEntry],
    task_scoped: bool,
) -> AppResult<()> {
    if task_scoped {
        let rows: Vec<TaskEntryRow> = entries.iter().map(TaskEntryRow::from).collect();
        serde_json::to_writer_pretty(&mut out, &rows)?;
    } else {
        let rows: Vec<TimeEntryRow> = entries.iter().map(TimeEntryRow::from).collect();
        serde_json::to_writer_pretty(&mut out, &rows)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_toil_entries<W: Write>(mut out: W, entries: &[ToilEntry]) -> AppResult<()> {
    let rows: Vec<ToilEntryRow> = entries.iter().map(ToilEntryRow::from).collect();
    serde_json::to_writer_pretty(&mut out, &rows)?;
    out.flush()?;
    Ok(())
}
