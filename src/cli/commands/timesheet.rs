use crate::cli::commands::toil::parse_status;
use crate::cli::parser::{Cli, TimesheetCmd};
use crate::cli::{open_pool, resolve_actor};
use crate::config::Config;
use crate::core::timesheet::TimesheetLogic;
use crate::errors::AppResult;
use crate::models::timesheet::TimesheetSubmission;
use crate::ui::messages::{self, info};
use crate::utils::colors::colorize;
use crate::utils::date::{format_date, require_date};
use crate::utils::formatting::describe_submission_status;
use crate::utils::table::Table;

pub fn handle(action: &TimesheetCmd, cli: &Cli, cfg: &Config) -> AppResult<bool> {
    let pool = open_pool(cfg)?;
    let actor = resolve_actor(&pool, cli, cfg)?;
    let mut logic = TimesheetLogic::new(pool);

    match action {
        TimesheetCmd::Submit { from, to, user } => {
            let from = require_date(from)?;
            let to = require_date(to)?;
            let user = user.as_deref().unwrap_or(&actor.id);
            let out = logic.submit(&actor, user, from, to)?;
            if let Some(s) = &out.data {
                print_timesheets(std::slice::from_ref(s));
            }
            Ok(messages::outcome(&out))
        }

        TimesheetCmd::Approve { id, comment } => {
            let out = logic.approve(&actor, *id, comment.as_deref())?;
            Ok(messages::outcome(&out))
        }

        TimesheetCmd::Reject { id, reason } => {
            let out = logic.reject(&actor, *id, reason.as_deref())?;
            Ok(messages::outcome(&out))
        }

        TimesheetCmd::List { user, status } => {
            let status = parse_status(status.as_deref())?;
            let out = logic.list(&actor, user.as_deref(), status)?;
            if !out.success {
                return Ok(messages::outcome(&out));
            }
            let list = out.data.unwrap_or_default();
            if list.is_empty() {
                info("No timesheets found.");
            } else {
                print_timesheets(&list);
            }
            Ok(true)
        }

        TimesheetCmd::Rejections { user } => {
            let out = logic.rejections(&actor, user.as_deref())?;
            if !out.success {
                return Ok(messages::outcome(&out));
            }
            let list = out.data.unwrap_or_default();
            if list.is_empty() {
                info("No rejected timesheets.");
                return Ok(true);
            }
            let mut table = Table::new(["ID", "Timesheet", "User", "Reason", "Rejected by", "At"]);
            for r in list {
                table.add_row(vec![
                    r.id.to_string(),
                    format!("#{}", r.submission_id),
                    r.user_id,
                    r.reason,
                    r.rejected_by,
                    r.rejected_at.chars().take(16).collect(),
                ]);
            }
            print!("{}", table.render());
            Ok(true)
        }
    }
}

fn print_timesheets(list: &[TimesheetSubmission]) {
    let mut table = Table::new(["ID", "User", "Range", "Total", "Status", "Reviewer"]);
    for s in list {
        let (label, color) = describe_submission_status(s.status);
        table.add_row(vec![
            s.id.to_string(),
            s.user_id.clone(),
            format!("{} → {}", format_date(&s.start_date), format_date(&s.end_date)),
            s.total_hours.clone(),
            colorize(label, color),
            s.approved_by.clone().unwrap_or_default(),
        ]);
    }
    print!("{}", table.render());
}
