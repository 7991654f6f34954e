// src/export/range.rs

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

fn invalid(what: &str, raw: &str) -> AppError {
    AppError::InvalidDate(format!("{what} in range '{raw}'"))
}

/// Parse `--range` (year / month / day / interval).
///
/// Supported:
/// - YYYY
/// - YYYY-MM
/// - YYYY-MM-DD
/// - YYYY:YYYY
/// - YYYY-MM:YYYY-MM
/// - YYYY-MM-DD:YYYY-MM-DD
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let r = r.trim();
    let (start, end) = match r.split_once(':') {
        Some((a, b)) => (a.trim(), b.trim()),
        None => (r, r),
    };

    if start.len() != end.len() {
        return Err(invalid("start and end must have the same format", r));
    }

    let (d1, _) = bounds(start).ok_or_else(|| invalid("invalid start", r))?;
    let (_, d2) = bounds(end).ok_or_else(|| invalid("invalid end", r))?;

    if d1 > d2 {
        return Err(invalid("start is after end", r));
    }
    Ok((d1, d2))
}

/// First and last day covered by a single `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
fn bounds(s: &str) -> Option<(NaiveDate, NaiveDate)> {
    match s.len() {
        4 => {
            let y: i32 = s.parse().ok()?;
            Some((
                NaiveDate::from_ymd_opt(y, 1, 1)?,
                NaiveDate::from_ymd_opt(y, 12, 31)?,
            ))
        }
        7 => {
            if s.as_bytes().get(4) != Some(&b'-') {
                return None;
            }
            let y: i32 = s.get(0..4)?.parse().ok()?;
            let m: u32 = s.get(5..7)?.parse().ok()?;
            let last = month_last_day(y, m)?;
            Some((
                NaiveDate::from_ymd_opt(y, m, 1)?,
                NaiveDate::from_ymd_opt(y, m, last)?,
            ))
        }
        10 => {
            let d = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
            Some((d, d))
        }
        _ => None,
    }
}

fn month_last_day(y: i32, m: u32) -> Option<u32> {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 => {
            let leap = (y % 4 == 0 && y % 100 != 0) || (y % 400 == 0);
            Some(if leap { 29 } else { 28 })
        }
        _ => None,
    }
}
