// src/export/model.rs

use crate::models::timesheet::TimeEntry;
use crate::models::toil_entry::ToilEntry;
use crate::utils::date::format_date;
use serde::Serialize;

/// One time entry as exported; the field names are the CSV header.
#[derive(Serialize, Clone, Debug)]
pub struct TimeEntryRow {
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Task")]
    pub task: String,
    #[serde(rename = "Subtask")]
    pub subtask: String,
    #[serde(rename = "Ticket")]
    pub ticket: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Hours")]
    pub hours: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

/// Task-scoped variant: the project is implied by the task.
#[derive(Serialize, Clone, Debug)]
pub struct TaskEntryRow {
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Task")]
    pub task: String,
    #[serde(rename = "Subtask")]
    pub subtask: String,
    #[serde(rename = "Ticket")]
    pub ticket: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Hours")]
    pub hours: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ToilEntryRow {
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Week")]
    pub week: String,
    #[serde(rename = "Requested")]
    pub requested: String,
    #[serde(rename = "Used")]
    pub used: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

impl From<&TimeEntry> for TimeEntryRow {
    fn from(e: &TimeEntry) -> Self {
        Self {
            user: e.user_id.clone(),
            project: e.project.clone(),
            task: e.task.clone(),
            subtask: e.subtask.clone().unwrap_or_default(),
            ticket: e.ticket.clone().unwrap_or_default(),
            date: format_date(&e.date),
            hours: e.hours.clone(),
            notes: e.notes.clone().unwrap_or_default(),
        }
    }
}

impl From<&TimeEntry> for TaskEntryRow {
    fn from(e: &TimeEntry) -> Self {
        let row = TimeEntryRow::from(e);
        Self {
            user: row.user,
            task: row.task,
            subtask: row.subtask,
            ticket: row.ticket,
            date: row.date,
            hours: row.hours,
            notes: row.notes,
        }
    }
}

impl From<&ToilEntry> for ToilEntryRow {
    fn from(e: &ToilEntry) -> Self {
        Self {
            user: e.user_id.clone(),
            date: format_date(&e.date),
            week: format_date(&e.week_start),
            requested: e.requested_hours.clone(),
            used: e.used_hours.clone(),
            status: e.status.to_string(),
            comments: e.comments.clone().unwrap_or_default(),
        }
    }
}
