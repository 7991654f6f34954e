//! Duration utilities: parsing and formatting `HH:MM` strings, quarter-hour rounding.
//!
//! Daily durations (earned or used TOIL, logged hours) live in the closed
//! range `00:00`–`16:00`. Balances and limits are unbounded and may be
//! negative, so they go through [`parse_hhmm`] instead.

use crate::errors::{AppError, AppResult};

/// Upper bound of a single day's duration, in minutes (`16:00`).
pub const MAX_DAILY_MINUTES: i64 = 16 * 60;

const QUARTER_HOUR: i64 = 15;

/// Parse a signed `H:MM` / `HH:MM` value with unbounded hours.
pub fn parse_hhmm(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (h, m) = body.split_once(':')?;
    if h.is_empty() || !h.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if m.len() != 2 || !m.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i64 = h.parse().ok()?;
    let minutes: i64 = m.parse().ok()?;
    if minutes > 59 {
        return None;
    }

    let total = hours.checked_mul(60)?.checked_add(minutes)?;
    Some(if negative { -total } else { total })
}

/// Parse a daily duration. Malformed or out-of-range input means "no time logged".
pub fn parse_duration(s: &str) -> i64 {
    match parse_hhmm(s) {
        Some(m) if (0..=MAX_DAILY_MINUTES).contains(&m) => m,
        _ => 0,
    }
}

/// Strict variant of [`parse_duration`] for user input.
pub fn validate_duration(s: &str) -> AppResult<i64> {
    match parse_hhmm(s) {
        Some(m) if (0..=MAX_DAILY_MINUTES).contains(&m) => Ok(m),
        _ => Err(AppError::InvalidDuration(s.to_string())),
    }
}

/// Validate a limit value (capacity, streak hours): any non-negative `HH:MM`.
pub fn validate_limit(s: &str) -> AppResult<i64> {
    match parse_hhmm(s) {
        Some(m) if m >= 0 => Ok(m),
        _ => Err(AppError::InvalidLimit(s.to_string())),
    }
}

/// Format minutes as `HH:MM`, negative values as `-HH:MM`.
pub fn format_duration(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.unsigned_abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Round to the nearest multiple of 15 minutes.
pub fn round_to_quarter_hour(mins: i64) -> i64 {
    (mins + QUARTER_HOUR / 2).div_euclid(QUARTER_HOUR) * QUARTER_HOUR
}

/// Validate free-form user input and snap it to the quarter-hour grid.
pub fn normalize_duration(s: &str) -> AppResult<i64> {
    let minutes = validate_duration(s)?;
    Ok(round_to_quarter_hour(minutes).min(MAX_DAILY_MINUTES))
}
