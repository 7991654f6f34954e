pub mod config;
pub mod export;
pub mod hours;
pub mod init;
pub mod log;
pub mod notifications;
pub mod timesheet;
pub mod toil;
pub mod user;
