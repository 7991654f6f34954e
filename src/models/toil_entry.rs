use super::status::EntryStatus;
use crate::utils::time::parse_duration;
use chrono::NaiveDate;
use serde::Serialize;

/// One user's TOIL record for one calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct ToilEntry {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,         // ⇔ toil_entries.date (TEXT "YYYY-MM-DD")
    pub requested_hours: String, // earned, "HH:MM"
    pub used_hours: String,      // spent, "HH:MM"
    pub status: EntryStatus,
    pub comments: Option<String>,
    pub admin_comments: Option<String>,
    pub week_start: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
}

impl ToilEntry {
    pub fn requested_minutes(&self) -> i64 {
        parse_duration(&self.requested_hours)
    }

    pub fn used_minutes(&self) -> i64 {
        parse_duration(&self.used_hours)
    }

    /// Contribution of this entry to the balance once approved.
    pub fn net_minutes(&self) -> i64 {
        self.requested_minutes() - self.used_minutes()
    }
}

/// Values written by an upsert keyed on `(user_id, date)`.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub user_id: String,
    pub date: NaiveDate,
    pub requested_hours: String,
    pub used_hours: String,
    pub comments: Option<String>,
    pub week_start: NaiveDate,
    /// Status used only when the row is inserted; updates keep the stored one.
    pub initial_status: EntryStatus,
}
