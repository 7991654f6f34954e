//! Review state machine shared by TOIL submissions and timesheets.
//!
//! ```text
//! draft ──submit──▶ pending ──approve──▶ approved
//!                     │  └────reject───▶ rejected
//!                     └──cancel──▶ (removed, entries back to draft)
//! ```
//!
//! Authorization is checked before state, so a caller without the right
//! privilege always gets an authorization failure.

use crate::errors::AppResult;
use crate::models::actor::Actor;
use crate::models::outcome::Rejection;
use crate::models::status::SubmissionStatus;
use crate::models::timesheet::TimesheetSubmission;
use crate::models::toil_submission::ToilSubmission;
use crate::utils::date::format_date;
use rusqlite::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Cancel,
    Approve,
    Reject,
}

impl Transition {
    pub fn verb(&self) -> &'static str {
        match self {
            Transition::Cancel => "cancel",
            Transition::Approve => "approve",
            Transition::Reject => "reject",
        }
    }

    /// Approve and reject resolve a submission; only administrators may do it.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Transition::Cancel)
    }
}

/// Status after `transition`; `None` means the active record goes away.
pub fn next_status(
    current: SubmissionStatus,
    transition: Transition,
) -> Result<Option<SubmissionStatus>, Rejection> {
    match (current, transition) {
        (SubmissionStatus::Pending, Transition::Cancel) => Ok(None),
        (SubmissionStatus::Pending, Transition::Approve) => Ok(Some(SubmissionStatus::Approved)),
        (SubmissionStatus::Pending, Transition::Reject) => Ok(Some(SubmissionStatus::Rejected)),
        (status, t) => Err(Rejection::invalid_state(format!(
            "Cannot {} a submission that is already {}.",
            t.verb(),
            status
        ))),
    }
}

impl SubmissionStatus {
    pub fn apply(self, transition: Transition) -> Result<Option<SubmissionStatus>, Rejection> {
        next_status(self, transition)
    }
}

/// Anything that goes through the review workflow.
pub trait Reviewable {
    fn owner(&self) -> &str;
    fn status(&self) -> SubmissionStatus;
    /// Short description used in messages, e.g. "TOIL week 2025-03-03".
    fn describe(&self) -> String;
}

impl Reviewable for ToilSubmission {
    fn owner(&self) -> &str {
        &self.user_id
    }

    fn status(&self) -> SubmissionStatus {
        self.status
    }

    fn describe(&self) -> String {
        format!("TOIL week {}", format_date(&self.week_start))
    }
}

impl Reviewable for TimesheetSubmission {
    fn owner(&self) -> &str {
        &self.user_id
    }

    fn status(&self) -> SubmissionStatus {
        self.status
    }

    fn describe(&self) -> String {
        format!(
            "timesheet {} to {}",
            format_date(&self.start_date),
            format_date(&self.end_date)
        )
    }
}

/// Only `owner` may perform `action` on their own records.
pub fn authorize_owner(actor: &Actor, owner: &str, action: &str) -> Result<(), Rejection> {
    if actor.is(owner) {
        Ok(())
    } else {
        Err(Rejection::unauthorized(format!(
            "Not authorized: only {owner} can {action} this submission."
        )))
    }
}

pub fn authorize<R: Reviewable>(
    actor: &Actor,
    item: &R,
    transition: Transition,
) -> Result<(), Rejection> {
    if transition.requires_admin() {
        if actor.is_admin {
            Ok(())
        } else {
            Err(Rejection::unauthorized(format!(
                "Not authorized: only administrators can {} submissions.",
                transition.verb()
            )))
        }
    } else {
        authorize_owner(actor, item.owner(), transition.verb())
    }
}

/// Authorize, then compute the next status.
pub fn review<R: Reviewable>(
    actor: &Actor,
    item: &R,
    transition: Transition,
) -> Result<Option<SubmissionStatus>, Rejection> {
    authorize(actor, item, transition)?;
    item.status().apply(transition)
}

/// Rejections must carry a reason.
pub fn require_reason(comments: Option<&str>) -> Result<String, Rejection> {
    match comments.map(str::trim) {
        Some(c) if !c.is_empty() => Ok(c.to_string()),
        _ => Err(Rejection::validation(
            "A comment explaining the rejection is required.",
        )),
    }
}

/// Store that keeps rejected records in an append-only log instead of the
/// active set.
pub trait RejectionArchive<R: Reviewable> {
    /// Record `item` with `reason`, then remove it from the active set.
    ///
    /// `on_archived` runs in the same transaction with the new archive id,
    /// so follow-up writes such as notifications commit or roll back with
    /// the archive. Returns the id of the archive record.
    fn archive_rejection<F>(
        &mut self,
        item: &R,
        reason: &str,
        reviewer: &str,
        on_archived: F,
    ) -> AppResult<i64>
    where
        F: FnMut(&Transaction<'_>, i64) -> AppResult<()>;
}
