use super::status::SubmissionStatus;
use chrono::NaiveDate;
use serde::Serialize;

/// A week of TOIL entries presented for review.
#[derive(Debug, Clone, Serialize)]
pub struct ToilSubmission {
    pub id: i64,
    pub user_id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub status: SubmissionStatus,
    pub submitted_at: String,
    pub approved_by: Option<String>, // reviewer, set on approval or rejection
    pub approved_at: Option<String>,
    pub comments: Option<String>,
}
