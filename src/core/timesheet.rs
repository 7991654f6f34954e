//! Project hours and the timesheet review workflow.
//!
//! Timesheets follow the same state machine as TOIL weeks, with two
//! differences: active timesheets of one user never overlap, and a rejected
//! timesheet is moved to the rejection archive and its owner is notified in
//! the same transaction.

use crate::core::workflow::{
    RejectionArchive, Reviewable, Transition, authorize_owner, require_reason, review,
};
use crate::db::log::ttlog;
use crate::db::notifications;
use crate::db::pool::DbPool;
use crate::db::timesheet::{self as ts, TimeEntryFilter};
use crate::errors::AppResult;
use crate::models::actor::{Actor, user_key};
use crate::models::notification::Notification;
use crate::models::outcome::{Outcome, Rejection};
use crate::models::status::SubmissionStatus;
use crate::models::timesheet::{NewTimeEntry, TimeEntry, TimesheetRejection, TimesheetSubmission};
use crate::utils::date::format_date;
use crate::utils::time::{format_duration, normalize_duration};
use chrono::NaiveDate;
use tracing::info;

pub struct TimesheetLogic {
    pool: DbPool,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TimesheetLogic {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn load(&self, id: i64) -> AppResult<Result<TimesheetSubmission, Rejection>> {
        let found = self.pool.run(|conn| ts::find_timesheet(conn, id))?;
        Ok(found.ok_or_else(|| Rejection::not_found(format!("Timesheet {id} not found."))))
    }

    // ---------------------------
    // Time entries
    // ---------------------------

    /// Record hours against a project and task.
    pub fn log_time(&mut self, actor: &Actor, entry: NewTimeEntry) -> AppResult<Outcome<TimeEntry>> {
        let user = user_key(&entry.user_id);
        if !actor.can_act_for(&user) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: {} cannot log hours for {user}.",
                actor.id
            ))
            .into());
        }

        let project = entry.project.trim().to_string();
        let task = entry.task.trim().to_string();
        if project.is_empty() || task.is_empty() {
            return Ok(Rejection::validation("Project and task are required.").into());
        }

        let minutes = match normalize_duration(&entry.hours) {
            Ok(0) => return Ok(Rejection::validation("Logged hours must be above 00:00.").into()),
            Ok(m) => m,
            Err(e) => return Ok(Rejection::validation(e.to_string()).into()),
        };

        let entry = NewTimeEntry {
            user_id: user.clone(),
            project,
            task,
            subtask: non_empty(entry.subtask),
            ticket: non_empty(entry.ticket),
            date: entry.date,
            hours: format_duration(minutes),
            notes: non_empty(entry.notes),
        };

        let saved = self.pool.transaction(|tx| {
            let saved = ts::insert_time_entry(tx, &entry)?;
            ttlog(
                tx,
                "hours_add",
                &user,
                &format!(
                    "{} {}/{} {}",
                    format_date(&saved.date),
                    saved.project,
                    saved.task,
                    saved.hours
                ),
            )?;
            Ok(saved)
        })?;

        let message = format!(
            "Logged {} on {}/{} for {}.",
            saved.hours,
            saved.project,
            saved.task,
            format_date(&saved.date)
        );
        Ok(Outcome::ok(saved, message))
    }

    /// Delete a time entry. A missing id is reported as success.
    pub fn delete_time(&mut self, actor: &Actor, id: i64) -> AppResult<Outcome<()>> {
        let Some(entry) = self.pool.run(|conn| ts::find_time_entry(conn, id))? else {
            return Ok(Outcome::done(format!("Time entry {id} not found, nothing to delete.")));
        };
        if !actor.can_act_for(&entry.user_id) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: only {} or an administrator can delete time entry {id}.",
                entry.user_id
            ))
            .into());
        }

        self.pool.transaction(|tx| {
            ts::delete_time_entry(tx, id)?;
            ttlog(
                tx,
                "hours_del",
                &entry.user_id,
                &format!("Deleted time entry {id} ({})", format_date(&entry.date)),
            )
        })?;
        Ok(Outcome::done(format!("Time entry {id} deleted.")))
    }

    /// Time entries matching `filter`. Non-administrators only see their own.
    pub fn list_time(
        &mut self,
        actor: &Actor,
        mut filter: TimeEntryFilter,
    ) -> AppResult<Outcome<Vec<TimeEntry>>> {
        match filter.user_id.as_deref().map(user_key) {
            Some(u) if !actor.can_act_for(&u) => {
                return Ok(Rejection::unauthorized(format!(
                    "Not authorized: {} cannot view hours of {u}.",
                    actor.id
                ))
                .into());
            }
            Some(u) => filter.user_id = Some(u),
            None if !actor.is_admin => filter.user_id = Some(user_key(&actor.id)),
            None => {}
        }

        let entries = self.pool.run(|conn| ts::list_time_entries(conn, &filter))?;
        let n = entries.len();
        Ok(Outcome::ok(entries, format!("{n} time entries.")))
    }

    // ---------------------------
    // Submissions
    // ---------------------------

    /// Submit the hours logged in `[from, to]` for review.
    pub fn submit(
        &mut self,
        actor: &Actor,
        user: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Outcome<TimesheetSubmission>> {
        let user = user_key(user);
        if let Err(r) = authorize_owner(actor, &user, "submit") {
            return Ok(r.into());
        }
        if from > to {
            return Ok(Rejection::validation(format!(
                "Invalid range: {} is after {}.",
                format_date(&from),
                format_date(&to)
            ))
            .into());
        }

        let filter = TimeEntryFilter {
            user_id: Some(user.clone()),
            from: Some(from),
            to: Some(to),
            ..TimeEntryFilter::default()
        };
        let entries = self.pool.run(|conn| ts::list_time_entries(conn, &filter))?;
        if entries.is_empty() {
            return Ok(Rejection::validation(format!(
                "No hours logged between {} and {}.",
                format_date(&from),
                format_date(&to)
            ))
            .into());
        }

        if let Some(existing) = self
            .pool
            .run(|conn| ts::find_overlapping_timesheet(conn, &user, &from, &to))?
        {
            return Ok(Rejection::invalid_state(format!(
                "A timesheet covering {} already exists ({}).",
                existing.describe(),
                existing.status
            ))
            .into());
        }

        let total = format_duration(entries.iter().map(TimeEntry::minutes).sum());
        let submission = self.pool.transaction(|tx| {
            let s = ts::insert_timesheet(tx, &user, &from, &to, &total)?;
            ttlog(
                tx,
                "timesheet_submit",
                &user,
                &format!("Submitted {} ({total}) as #{}", s.describe(), s.id),
            )?;
            Ok(s)
        })?;

        info!(user = %user, id = submission.id, "timesheet submitted");
        let message = format!(
            "Timesheet {} to {} submitted ({total}).",
            format_date(&from),
            format_date(&to)
        );
        Ok(Outcome::ok(submission, message))
    }

    pub fn approve(
        &mut self,
        actor: &Actor,
        id: i64,
        comments: Option<&str>,
    ) -> AppResult<Outcome<TimesheetSubmission>> {
        let submission = match self.load(id)? {
            Ok(s) => s,
            Err(r) => return Ok(r.into()),
        };
        if let Err(r) = review(actor, &submission, Transition::Approve) {
            return Ok(r.into());
        }

        let comments = comments.map(str::trim).filter(|c| !c.is_empty());
        let updated = self.pool.transaction(|tx| {
            let updated = ts::update_timesheet_status(
                tx,
                id,
                SubmissionStatus::Approved,
                &actor.id,
                comments,
            )?;
            ttlog(
                tx,
                "timesheet_approve",
                &submission.user_id,
                &format!("Timesheet #{id} approved by {}", actor.id),
            )?;
            Ok(updated)
        })?;

        match updated {
            Some(s) => Ok(Outcome::ok(s, format!("Timesheet {id} approved."))),
            None => Ok(Rejection::not_found(format!("Timesheet {id} not found.")).into()),
        }
    }

    /// Reject a pending timesheet: archive it with the reason, remove it
    /// from the active set and notify the owner. Returns the archive id.
    pub fn reject(
        &mut self,
        actor: &Actor,
        id: i64,
        reason: Option<&str>,
    ) -> AppResult<Outcome<i64>> {
        let submission = match self.load(id)? {
            Ok(s) => s,
            Err(r) => return Ok(r.into()),
        };
        let reason = match review(actor, &submission, Transition::Reject)
            .and_then(|_| require_reason(reason))
        {
            Ok(reason) => reason,
            Err(r) => return Ok(r.into()),
        };

        let note = format!(
            "Your {} was rejected by {}: {reason}",
            submission.describe(),
            actor.id
        );
        let owner = submission.user_id.clone();
        let archive_id = self.pool.archive_rejection(
            &submission,
            &reason,
            &actor.id,
            |tx, archive_id| {
                notifications::insert_notification(tx, &owner, &note)?;
                ttlog(
                    tx,
                    "timesheet_reject",
                    &owner,
                    &format!("Timesheet #{id} archived as rejection #{archive_id}"),
                )
            },
        )?;

        info!(id, archive_id, reviewer = %actor.id, "timesheet rejected");
        Ok(Outcome::ok(
            archive_id,
            format!("Timesheet {id} rejected and archived."),
        ))
    }

    /// Active timesheets. Without `user`, administrators see everyone's.
    pub fn list(
        &mut self,
        actor: &Actor,
        user: Option<&str>,
        status: Option<SubmissionStatus>,
    ) -> AppResult<Outcome<Vec<TimesheetSubmission>>> {
        let user = match self.scope(actor, user) {
            Ok(u) => u,
            Err(r) => return Ok(r.into()),
        };
        let list = self
            .pool
            .run(|conn| ts::list_timesheets(conn, user.as_deref(), status))?;
        let n = list.len();
        Ok(Outcome::ok(list, format!("{n} timesheet(s).")))
    }

    pub fn rejections(
        &mut self,
        actor: &Actor,
        user: Option<&str>,
    ) -> AppResult<Outcome<Vec<TimesheetRejection>>> {
        let user = match self.scope(actor, user) {
            Ok(u) => u,
            Err(r) => return Ok(r.into()),
        };
        let list = self
            .pool
            .run(|conn| ts::list_rejections(conn, user.as_deref()))?;
        let n = list.len();
        Ok(Outcome::ok(list, format!("{n} rejected timesheet(s).")))
    }

    /// Notifications of the acting user, optionally marking them read.
    pub fn notifications(
        &mut self,
        actor: &Actor,
        unread_only: bool,
        mark_read: bool,
    ) -> AppResult<Outcome<Vec<Notification>>> {
        let user = user_key(&actor.id);
        let list = self
            .pool
            .run(|conn| notifications::list_notifications(conn, &user, unread_only))?;
        if mark_read {
            self.pool
                .run(|conn| notifications::mark_all_read(conn, &user))?;
        }
        let n = list.len();
        Ok(Outcome::ok(list, format!("{n} notification(s).")))
    }

    fn scope(&self, actor: &Actor, user: Option<&str>) -> Result<Option<String>, Rejection> {
        match user.map(user_key) {
            Some(u) if !actor.can_act_for(&u) => Err(Rejection::unauthorized(format!(
                "Not authorized: {} cannot view timesheets of {u}.",
                actor.id
            ))),
            Some(u) => Ok(Some(u)),
            None if actor.is_admin => Ok(None),
            None => Ok(Some(user_key(&actor.id))),
        }
    }
}
