pub mod balance;
pub mod cache;
pub mod log;
pub mod policy;
pub mod retry;
pub mod submission;
pub mod timesheet;
pub mod toil;
pub mod users;
pub mod workflow;
