use crate::cli::parser::{Cli, HoursCmd};
use crate::cli::{open_pool, period_bounds, resolve_actor};
use crate::config::Config;
use crate::core::timesheet::TimesheetLogic;
use crate::db::timesheet::TimeEntryFilter;
use crate::errors::AppResult;
use crate::models::timesheet::{NewTimeEntry, TimeEntry};
use crate::ui::messages::{self, info};
use crate::utils::date::{format_date, require_date};
use crate::utils::formatting::mins2readable;
use crate::utils::table::Table;

pub fn handle(action: &HoursCmd, cli: &Cli, cfg: &Config) -> AppResult<bool> {
    let pool = open_pool(cfg)?;
    let actor = resolve_actor(&pool, cli, cfg)?;
    let mut logic = TimesheetLogic::new(pool);

    match action {
        HoursCmd::Add {
            date,
            project,
            task,
            subtask,
            ticket,
            hours,
            notes,
            user,
        } => {
            let entry = NewTimeEntry {
                user_id: user.clone().unwrap_or_else(|| actor.id.clone()),
                project: project.clone(),
                task: task.clone(),
                subtask: subtask.clone(),
                ticket: ticket.clone(),
                date: require_date(date)?,
                hours: hours.clone(),
                notes: notes.clone(),
            };
            let out = logic.log_time(&actor, entry)?;
            Ok(messages::outcome(&out))
        }

        HoursCmd::Del { id } => {
            let out = logic.delete_time(&actor, *id)?;
            Ok(messages::outcome(&out))
        }

        HoursCmd::List {
            user,
            period,
            project,
            task,
        } => {
            let (from, to) = period_bounds(period.as_deref())?;
            let filter = TimeEntryFilter {
                user_id: user.clone(),
                from,
                to,
                project: project.clone(),
                task: task.clone(),
            };
            let out = logic.list_time(&actor, filter)?;
            if !out.success {
                return Ok(messages::outcome(&out));
            }
            let entries = out.data.unwrap_or_default();
            if entries.is_empty() {
                info("No hours logged.");
            } else {
                print_time_entries(&entries);
            }
            Ok(true)
        }
    }
}

fn print_time_entries(entries: &[TimeEntry]) {
    let mut table = Table::new([
        "ID", "User", "Date", "Project", "Task", "Subtask", "Ticket", "Hours", "Notes",
    ]);
    for e in entries {
        table.add_row(vec![
            e.id.to_string(),
            e.user_id.clone(),
            format_date(&e.date),
            e.project.clone(),
            e.task.clone(),
            e.subtask.clone().unwrap_or_default(),
            e.ticket.clone().unwrap_or_default(),
            e.hours.clone(),
            e.notes.clone().unwrap_or_default(),
        ]);
    }
    print!("{}", table.render());

    let total: i64 = entries.iter().map(TimeEntry::minutes).sum();
    println!("Total: {}", mins2readable(total, false, false));
}
