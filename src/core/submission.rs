//! Weekly TOIL submissions: submit, cancel, approve, reject.
//!
//! Each transition updates the submission row and stamps every entry of the
//! week in one transaction.

use crate::core::toil::ToilService;
use crate::core::workflow::{Transition, authorize_owner, require_reason, review};
use crate::db::log::ttlog;
use crate::db::{submissions, toil};
use crate::errors::AppResult;
use crate::models::actor::{Actor, user_key};
use crate::models::outcome::{Outcome, Rejection};
use crate::models::status::{EntryStatus, SubmissionStatus};
use crate::models::toil_submission::ToilSubmission;
use crate::utils::date::{format_date, week_start};
use chrono::NaiveDate;
use tracing::info;

impl ToilService {
    fn load_submission(&self, id: i64) -> AppResult<Result<ToilSubmission, Rejection>> {
        let found = self
            .pool
            .run(|conn| submissions::find_submission(conn, id))?;
        Ok(found.ok_or_else(|| Rejection::not_found(format!("Submission {id} not found."))))
    }

    /// Submit the week containing `date` for review.
    ///
    /// A previously rejected week is reopened in place; a week already
    /// pending or approved cannot be submitted again.
    pub fn submit(
        &mut self,
        actor: &Actor,
        user: &str,
        date: NaiveDate,
    ) -> AppResult<Outcome<ToilSubmission>> {
        let user = user_key(user);
        if let Err(r) = authorize_owner(actor, &user, "submit") {
            return Ok(r.into());
        }

        let week = week_start(date);
        let entries = self
            .pool
            .run(|conn| toil::list_week_entries(conn, &user, &week))?;
        if entries.is_empty() {
            return Ok(Rejection::validation(format!(
                "No TOIL entries to submit for the week of {}.",
                format_date(&week)
            ))
            .into());
        }

        let existing = self
            .pool
            .run(|conn| submissions::find_submission_by_week(conn, &user, &week))?;
        if let Some(s) = existing.filter(|s| s.status != SubmissionStatus::Rejected) {
            return Ok(Rejection::invalid_state(format!(
                "The week of {} is already {}.",
                format_date(&week),
                s.status
            ))
            .into());
        }

        let count = entries.len();
        let submission = self.pool.transaction(|tx| {
            let s = submissions::upsert_pending_submission(tx, &user, &week)?;
            toil::set_week_status(tx, &user, &week, EntryStatus::Pending, None)?;
            ttlog(
                tx,
                "toil_submit",
                &user,
                &format!(
                    "Submitted week {} ({count} entries) as #{}",
                    format_date(&week),
                    s.id
                ),
            )?;
            Ok(s)
        })?;

        info!(user = %user, week = %week, id = submission.id, "week submitted");
        let message = format!(
            "Week of {} submitted for review ({count} entries).",
            format_date(&week)
        );
        Ok(Outcome::ok(submission, message))
    }

    /// Withdraw a pending submission; its entries go back to draft.
    pub fn cancel(&mut self, actor: &Actor, id: i64) -> AppResult<Outcome<()>> {
        let submission = match self.load_submission(id)? {
            Ok(s) => s,
            Err(r) => return Ok(r.into()),
        };
        if let Err(r) = review(actor, &submission, Transition::Cancel) {
            return Ok(r.into());
        }

        self.pool.transaction(|tx| {
            toil::set_week_status(
                tx,
                &submission.user_id,
                &submission.week_start,
                EntryStatus::Draft,
                None,
            )?;
            submissions::delete_submission(tx, id)?;
            ttlog(
                tx,
                "toil_cancel",
                &submission.user_id,
                &format!("Cancelled submission #{id}"),
            )?;
            Ok(())
        })?;

        Ok(Outcome::done(format!(
            "Submission {id} cancelled; entries are back to draft."
        )))
    }

    /// Approve a pending submission and fold its entries into the balance.
    pub fn approve(
        &mut self,
        actor: &Actor,
        id: i64,
        comments: Option<&str>,
    ) -> AppResult<Outcome<ToilSubmission>> {
        let submission = match self.load_submission(id)? {
            Ok(s) => s,
            Err(r) => return Ok(r.into()),
        };
        if let Err(r) = review(actor, &submission, Transition::Approve) {
            return Ok(r.into());
        }

        let comments = comments.map(str::trim).filter(|c| !c.is_empty());
        let updated = self.pool.transaction(|tx| {
            let updated = submissions::update_submission_status(
                tx,
                id,
                SubmissionStatus::Approved,
                &actor.id,
                comments,
            )?;
            toil::set_week_status(
                tx,
                &submission.user_id,
                &submission.week_start,
                EntryStatus::Approved,
                comments,
            )?;
            ttlog(
                tx,
                "toil_approve",
                &submission.user_id,
                &format!("Submission #{id} approved by {}", actor.id),
            )?;
            Ok(updated)
        })?;

        let balance = self.recompute_balance(&submission.user_id)?;
        info!(id, reviewer = %actor.id, balance, "submission approved");

        match updated {
            Some(s) => Ok(Outcome::ok(s, format!("Submission {id} approved."))),
            None => Ok(Rejection::not_found(format!("Submission {id} not found.")).into()),
        }
    }

    /// Reject a pending submission. A reason is required; the balance is untouched.
    pub fn reject(
        &mut self,
        actor: &Actor,
        id: i64,
        comments: Option<&str>,
    ) -> AppResult<Outcome<ToilSubmission>> {
        let submission = match self.load_submission(id)? {
            Ok(s) => s,
            Err(r) => return Ok(r.into()),
        };
        let reason = match review(actor, &submission, Transition::Reject)
            .and_then(|_| require_reason(comments))
        {
            Ok(reason) => reason,
            Err(r) => return Ok(r.into()),
        };

        let updated = self.pool.transaction(|tx| {
            let updated = submissions::update_submission_status(
                tx,
                id,
                SubmissionStatus::Rejected,
                &actor.id,
                Some(&reason),
            )?;
            toil::set_week_status(
                tx,
                &submission.user_id,
                &submission.week_start,
                EntryStatus::Rejected,
                Some(&reason),
            )?;
            ttlog(
                tx,
                "toil_reject",
                &submission.user_id,
                &format!("Submission #{id} rejected by {}: {reason}", actor.id),
            )?;
            Ok(updated)
        })?;

        info!(id, reviewer = %actor.id, "submission rejected");
        match updated {
            Some(s) => Ok(Outcome::ok(s, format!("Submission {id} rejected."))),
            None => Ok(Rejection::not_found(format!("Submission {id} not found.")).into()),
        }
    }

    /// Submissions visible to `actor`. Without `user`, administrators see
    /// everyone's and other users see their own.
    pub fn list_submissions(
        &mut self,
        actor: &Actor,
        user: Option<&str>,
        status: Option<SubmissionStatus>,
    ) -> AppResult<Outcome<Vec<ToilSubmission>>> {
        let user = match user.map(user_key) {
            Some(u) if !actor.can_act_for(&u) => {
                return Ok(Rejection::unauthorized(format!(
                    "Not authorized: {} cannot view submissions of {u}.",
                    actor.id
                ))
                .into());
            }
            Some(u) => Some(u),
            None if actor.is_admin => None,
            None => Some(user_key(&actor.id)),
        };

        let list = self
            .pool
            .run(|conn| submissions::list_submissions(conn, user.as_deref(), status))?;
        let n = list.len();
        Ok(Outcome::ok(list, format!("{n} submission(s).")))
    }
}
