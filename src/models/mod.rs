pub mod actor;
pub mod notification;
pub mod outcome;
pub mod status;
pub mod timesheet;
pub mod toil_entry;
pub mod toil_settings;
pub mod toil_submission;
pub mod user;
