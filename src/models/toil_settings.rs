use crate::utils::time::parse_hhmm;
use serde::Serialize;

pub const DEFAULT_MAX_CAPACITY: &str = "40:00";
pub const DEFAULT_MAX_STREAK_HOURS: &str = "16:00";
pub const DEFAULT_MAX_STREAK_DAYS: i64 = 2;
/// Widest streak window accepted, one leap year.
pub const MAX_STREAK_DAYS: i64 = 366;

/// Per-user TOIL limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToilSettings {
    pub user_id: String,
    pub max_capacity: String,
    pub max_streak_hours: String,
    pub max_streak_days: i64,
}

impl ToilSettings {
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            max_capacity: DEFAULT_MAX_CAPACITY.to_string(),
            max_streak_hours: DEFAULT_MAX_STREAK_HOURS.to_string(),
            max_streak_days: DEFAULT_MAX_STREAK_DAYS,
        }
    }

    pub fn capacity_minutes(&self) -> i64 {
        parse_hhmm(&self.max_capacity).unwrap_or(0).max(0)
    }

    pub fn streak_minutes(&self) -> i64 {
        parse_hhmm(&self.max_streak_hours).unwrap_or(0).max(0)
    }

    /// Days strictly before the target date that count towards a streak.
    ///
    /// Stored values outside `1..=MAX_STREAK_DAYS` are clamped.
    pub fn streak_lookback_days(&self) -> u64 {
        u64::try_from(self.max_streak_days.clamp(1, MAX_STREAK_DAYS) - 1).unwrap_or(0)
    }
}

/// Partial update applied by an administrator.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub max_capacity: Option<String>,
    pub max_streak_hours: Option<String>,
    pub max_streak_days: Option<i64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.max_capacity.is_none()
            && self.max_streak_hours.is_none()
            && self.max_streak_days.is_none()
    }
}

/// Balance as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceView {
    pub user_id: String,
    /// Authoritative balance over approved entries, signed "HH:MM".
    pub total_hours: String,
    /// Net of entries still awaiting review; display only.
    pub pending_hours: String,
    pub updated_at: Option<String>,
}
