use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Days, NaiveDate};

pub const DATE_FMT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FMT).ok()
}

/// Like [`parse_date`], but reports the offending input.
pub fn require_date(s: &str) -> AppResult<NaiveDate> {
    parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

/// Monday of the ISO week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    let offset = u64::from(d.weekday().num_days_from_monday());
    d.checked_sub_days(Days::new(offset)).unwrap_or(d)
}

/// Sunday of the ISO week containing `d`.
pub fn week_end(d: NaiveDate) -> NaiveDate {
    let start = week_start(d);
    start.checked_add_days(Days::new(6)).unwrap_or(start)
}

/// First day of the trailing window of `days` days ending just before `target`.
///
/// A window of zero days starts at `target` itself, i.e. it is empty.
/// Windows reaching past the calendar start at [`NaiveDate::MIN`].
pub fn window_start(target: NaiveDate, days: u64) -> NaiveDate {
    target
        .checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Last day of the window of `days` days starting just after `target`.
pub fn window_end(target: NaiveDate, days: u64) -> NaiveDate {
    target
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}
