use crate::cli::parser::{Cli, ToilCmd};
use crate::cli::{open_pool, period_bounds, resolve_actor};
use crate::config::Config;
use crate::core::toil::ToilService;
use crate::errors::{AppError, AppResult};
use crate::models::outcome::Outcome;
use crate::models::status::SubmissionStatus;
use crate::models::toil_entry::ToilEntry;
use crate::models::toil_settings::{SettingsPatch, ToilSettings};
use crate::models::toil_submission::ToilSubmission;
use crate::ui::messages::{self, info};
use crate::utils::colors::{color_for_balance, colorize, colorize_duration};
use crate::utils::date::{format_date, require_date, today};
use crate::utils::formatting::{describe_entry_status, describe_submission_status, mins2readable};
use crate::utils::table::Table;
use crate::utils::time::parse_hhmm;

pub fn handle(action: &ToilCmd, cli: &Cli, cfg: &Config) -> AppResult<bool> {
    let pool = open_pool(cfg)?;
    let actor = resolve_actor(&pool, cli, cfg)?;
    let mut svc = ToilService::new(pool, cfg);

    match action {
        ToilCmd::Add {
            date,
            earned,
            used,
            comment,
            user,
        } => {
            let date = require_date(date)?;
            let user = user.as_deref().unwrap_or(&actor.id);
            let out = svc.upsert_entry(&actor, user, date, earned, used, comment.as_deref())?;
            if let Some(entry) = &out.data {
                print_entries(std::slice::from_ref(entry));
            }
            Ok(messages::outcome(&out))
        }

        ToilCmd::Del { id } => {
            let out = svc.delete_entry(&actor, *id)?;
            Ok(messages::outcome(&out))
        }

        ToilCmd::List { user, period } => {
            let (from, to) = period_bounds(period.as_deref())?;
            let user = user.as_deref().unwrap_or(&actor.id);
            let out = svc.list_entries(&actor, user, from, to)?;
            show(out, |entries| {
                if entries.is_empty() {
                    info("No TOIL entries found.");
                } else {
                    print_entries(entries);
                }
            })
        }

        ToilCmd::Balance { user, json } => {
            let user = user.as_deref().unwrap_or(&actor.id);
            let out = svc.get_balance(&actor, user)?;
            if !out.success {
                return Ok(messages::outcome(&out));
            }
            if let Some(view) = &out.data {
                if *json {
                    println!("{}", serde_json::to_string_pretty(view)?);
                } else {
                    let total = parse_hhmm(&view.total_hours).unwrap_or(0);
                    let pending = parse_hhmm(&view.pending_hours).unwrap_or(0);
                    println!("👤 {}", view.user_id);
                    println!(
                        "⏱️  Balance : {} ({})",
                        colorize(&view.total_hours, color_for_balance(total)),
                        mins2readable(total, true, false)
                    );
                    println!(
                        "⏳ Pending : {}",
                        colorize_duration(&mins2readable(pending, true, true))
                    );
                }
            }
            Ok(true)
        }

        ToilCmd::Settings {
            user,
            max_capacity,
            max_streak_hours,
            max_streak_days,
        } => {
            let user = user.as_deref().unwrap_or(&actor.id);
            let patch = SettingsPatch {
                max_capacity: max_capacity.clone(),
                max_streak_hours: max_streak_hours.clone(),
                max_streak_days: *max_streak_days,
            };
            let out = if patch.is_empty() {
                svc.get_settings(&actor, user)?
            } else {
                svc.update_settings(&actor, user, &patch)?
            };
            if let Some(s) = &out.data {
                print_settings(s);
            }
            Ok(messages::outcome(&out))
        }

        ToilCmd::Submit { week, user } => {
            let date = match week {
                Some(w) => require_date(w)?,
                None => today(),
            };
            let user = user.as_deref().unwrap_or(&actor.id);
            let out = svc.submit(&actor, user, date)?;
            if let Some(s) = &out.data {
                print_submissions(std::slice::from_ref(s));
            }
            Ok(messages::outcome(&out))
        }

        ToilCmd::Cancel { id } => {
            let out = svc.cancel(&actor, *id)?;
            Ok(messages::outcome(&out))
        }

        ToilCmd::Approve { id, comment } => {
            let out = svc.approve(&actor, *id, comment.as_deref())?;
            Ok(messages::outcome(&out))
        }

        ToilCmd::Reject { id, comment } => {
            let out = svc.reject(&actor, *id, comment.as_deref())?;
            Ok(messages::outcome(&out))
        }

        ToilCmd::Submissions { user, status } => {
            let status = parse_status(status.as_deref())?;
            let out = svc.list_submissions(&actor, user.as_deref(), status)?;
            show(out, |list| {
                if list.is_empty() {
                    info("No submissions found.");
                } else {
                    print_submissions(list);
                }
            })
        }

        ToilCmd::Recalc => {
            let out = svc.recalculate_all(&actor)?;
            if let Some(list) = &out.data {
                let mut table = Table::new(["User", "Balance"]);
                for (user, minutes) in list {
                    table.add_row(vec![
                        user.clone(),
                        colorize(&mins2readable(*minutes, true, true), color_for_balance(*minutes)),
                    ]);
                }
                if !table.is_empty() {
                    print!("{}", table.render());
                }
            }
            Ok(messages::outcome(&out))
        }
    }
}

pub(crate) fn parse_status(raw: Option<&str>) -> AppResult<Option<SubmissionStatus>> {
    raw.map(|s| SubmissionStatus::from_code(s).ok_or_else(|| AppError::InvalidStatus(s.to_string())))
        .transpose()
}

/// Render a listing outcome: data on success, the message on failure.
fn show<T>(out: Outcome<T>, render: impl FnOnce(&T)) -> AppResult<bool> {
    if !out.success {
        return Ok(messages::outcome(&out));
    }
    if let Some(data) = &out.data {
        render(data);
    }
    Ok(true)
}

fn print_entries(entries: &[ToilEntry]) {
    let mut table = Table::new(["ID", "Date", "Week", "Earned", "Used", "Status", "Comments"]);
    for e in entries {
        let (label, color) = describe_entry_status(e.status);
        table.add_row(vec![
            e.id.to_string(),
            format_date(&e.date),
            format_date(&e.week_start),
            colorize_duration(&e.requested_hours),
            colorize_duration(&e.used_hours),
            colorize(label, color),
            e.comments.clone().unwrap_or_default(),
        ]);
    }
    print!("{}", table.render());
}

fn print_submissions(list: &[ToilSubmission]) {
    let mut table = Table::new(["ID", "User", "Week", "Status", "Reviewer", "Comments"]);
    for s in list {
        let (label, color) = describe_submission_status(s.status);
        table.add_row(vec![
            s.id.to_string(),
            s.user_id.clone(),
            format!("{} → {}", format_date(&s.week_start), format_date(&s.week_end)),
            colorize(label, color),
            s.approved_by.clone().unwrap_or_default(),
            s.comments.clone().unwrap_or_default(),
        ]);
    }
    print!("{}", table.render());
}

fn print_settings(s: &ToilSettings) {
    println!("👤 {}", s.user_id);
    println!("   max capacity     : {}", s.max_capacity);
    println!(
        "   max streak       : {} over {} day(s)",
        s.max_streak_hours, s.max_streak_days
    );
}
