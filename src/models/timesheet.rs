use super::status::SubmissionStatus;
use crate::utils::time::parse_duration;
use chrono::NaiveDate;
use serde::Serialize;

/// Hours logged against a project / task / subtask.
#[derive(Debug, Clone, Serialize)]
pub struct TimeEntry {
    pub id: i64,
    pub user_id: String,
    pub project: String,
    pub task: String,
    pub subtask: Option<String>,
    pub ticket: Option<String>,
    pub date: NaiveDate,
    pub hours: String, // "HH:MM"
    pub notes: Option<String>,
    pub created_at: String,
}

impl TimeEntry {
    pub fn minutes(&self) -> i64 {
        parse_duration(&self.hours)
    }
}

#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub user_id: String,
    pub project: String,
    pub task: String,
    pub subtask: Option<String>,
    pub ticket: Option<String>,
    pub date: NaiveDate,
    pub hours: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimesheetSubmission {
    pub id: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubmissionStatus,
    pub submitted_at: String,
    pub total_hours: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub comments: Option<String>,
}

/// Archived copy of a rejected timesheet; never updated.
#[derive(Debug, Clone, Serialize)]
pub struct TimesheetRejection {
    pub id: i64,
    pub submission_id: i64,
    pub user_id: String,
    /// JSON of the submission as it was when rejected.
    pub payload: String,
    pub reason: String,
    pub rejected_by: String,
    pub rejected_at: String,
}

