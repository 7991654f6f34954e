//! TOIL entry lifecycle, balances and per-user settings.
//!
//! [`ToilService`] owns the database handle and the caches for the duration
//! of one process. Every write invalidates the affected cache keys; the
//! stored balance is always re-derived from the approved entries.

use crate::config::Config;
use crate::core::balance::{compute_balance, pending_delta};
use crate::core::cache::TtlCache;
use crate::core::policy::{
    capacity_message, check_capacity_limit, check_streak_limit, streak_message,
};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::{submissions, toil};
use crate::errors::AppResult;
use crate::models::actor::{Actor, user_key};
use crate::models::outcome::{FailureKind, Outcome, Rejection};
use crate::models::status::{EntryStatus, SubmissionStatus};
use crate::models::toil_entry::{EntryDraft, ToilEntry};
use crate::models::toil_settings::{BalanceView, MAX_STREAK_DAYS, SettingsPatch, ToilSettings};
use crate::utils::date::{format_date, week_start, window_end, window_start};
use crate::utils::time::{format_duration, normalize_duration, validate_limit};
use chrono::NaiveDate;
use std::time::Duration;
use tracing::{debug, info};

pub struct ToilService {
    pub(crate) pool: DbPool,
    defaults: ToilSettings,
    settings_cache: TtlCache<String, ToilSettings>,
    balance_cache: TtlCache<String, i64>,
}

impl ToilService {
    /// Service with caches sized from the configuration.
    pub fn new(pool: DbPool, cfg: &Config) -> Self {
        let ttl = Duration::from_secs(cfg.cache.ttl_secs);
        Self::with_caches(
            pool,
            cfg.default_settings(""),
            TtlCache::new(ttl, cfg.cache.capacity),
            TtlCache::new(ttl, cfg.cache.capacity),
        )
    }

    pub fn with_caches(
        pool: DbPool,
        defaults: ToilSettings,
        settings_cache: TtlCache<String, ToilSettings>,
        balance_cache: TtlCache<String, i64>,
    ) -> Self {
        Self {
            pool,
            defaults,
            settings_cache,
            balance_cache,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    // ---------------------------
    // Cached reads
    // ---------------------------

    /// Settings for `user`, created with the configured defaults on first access.
    pub(crate) fn settings_for(&mut self, user: &str) -> AppResult<ToilSettings> {
        if let Some(s) = self.settings_cache.get(user) {
            return Ok(s);
        }
        let defaults = ToilSettings {
            user_id: user.to_string(),
            ..self.defaults.clone()
        };
        let settings = self
            .pool
            .run(|conn| toil::get_or_create_settings(conn, user, &defaults))?;
        self.settings_cache.insert(user.to_string(), settings.clone());
        Ok(settings)
    }

    /// Approved balance in minutes, from cache or recomputed.
    pub(crate) fn balance_minutes(&mut self, user: &str) -> AppResult<i64> {
        if let Some(b) = self.balance_cache.get(user) {
            debug!(user, balance = b, "balance cache hit");
            return Ok(b);
        }
        let approved = self
            .pool
            .run(|conn| toil::list_approved_entries(conn, user))?;
        let minutes = compute_balance(&approved);
        self.balance_cache.insert(user.to_string(), minutes);
        Ok(minutes)
    }

    /// Re-derive the balance of `user` from approved entries and store it.
    pub fn recompute_balance(&mut self, user: &str) -> AppResult<i64> {
        let user = user_key(user);
        self.balance_cache.invalidate(&user);

        let approved = self
            .pool
            .run(|conn| toil::list_approved_entries(conn, &user))?;
        let minutes = compute_balance(&approved);
        self.pool
            .run(|conn| toil::save_balance(conn, &user, minutes))?;

        self.balance_cache.insert(user.clone(), minutes);
        debug!(user = %user, balance = minutes, "balance recomputed");
        Ok(minutes)
    }

    // ---------------------------
    // Entries
    // ---------------------------

    /// Record earned and/or used TOIL for one day.
    ///
    /// Hours are validated, rounded to the quarter hour, and checked against
    /// the streak and capacity limits before anything is written. An existing
    /// entry for the same day is updated in place and keeps its status.
    /// Weeks that are already approved are read-only.
    pub fn upsert_entry(
        &mut self,
        actor: &Actor,
        user: &str,
        date: NaiveDate,
        requested_hours: &str,
        used_hours: &str,
        comments: Option<&str>,
    ) -> AppResult<Outcome<ToilEntry>> {
        let user = user_key(user);
        if !actor.can_act_for(&user) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: {} cannot record TOIL for {user}.",
                actor.id
            ))
            .into());
        }

        let requested = match normalize_duration(requested_hours) {
            Ok(m) => m,
            Err(e) => return Ok(Outcome::fail(FailureKind::Validation, e.to_string())),
        };
        let used = match normalize_duration(used_hours) {
            Ok(m) => m,
            Err(e) => return Ok(Outcome::fail(FailureKind::Validation, e.to_string())),
        };
        if requested == 0 && used == 0 {
            return Ok(Outcome::fail(
                FailureKind::Validation,
                "A TOIL entry needs earned or used time.",
            ));
        }

        let week = week_start(date);
        let existing = self
            .pool
            .run(|conn| toil::find_entry_by_date(conn, &user, &date))?;
        let week_status = self
            .pool
            .run(|conn| submissions::find_submission_by_week(conn, &user, &week))?
            .map(|s| s.status);
        let locked = week_status == Some(SubmissionStatus::Approved)
            || existing.as_ref().is_some_and(|e| e.status.is_approved());
        if locked {
            return Ok(Rejection::invalid_state(format!(
                "The week of {} is already approved; its entries can no longer change.",
                format_date(&week)
            ))
            .into());
        }

        let settings = self.settings_for(&user)?;

        if used > 0 {
            let span = settings.streak_lookback_days();
            let from = window_start(date, span);
            let to = window_end(date, span);
            let nearby = self
                .pool
                .run(|conn| toil::list_entries_between(conn, &user, &from, &to))?;
            let check = check_streak_limit(&settings, &nearby, date, used);
            if !check.allowed {
                info!(user = %user, date = %date, "streak limit reached");
                return Ok(Outcome::fail(
                    FailureKind::Validation,
                    streak_message(&settings, &check),
                ));
            }
        }

        // Unapproved entries never count, so the day being edited adds nothing.
        if requested > 0 {
            let balance = self.balance_minutes(&user)?;
            let check = check_capacity_limit(&settings, balance, requested);
            if !check.allowed {
                info!(user = %user, date = %date, "capacity limit reached");
                return Ok(Outcome::fail(
                    FailureKind::Validation,
                    capacity_message(&settings, &check),
                ));
            }
        }

        let draft = EntryDraft {
            user_id: user.clone(),
            date,
            requested_hours: format_duration(requested),
            used_hours: format_duration(used),
            comments: comments
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            week_start: week,
            initial_status: if week_status == Some(SubmissionStatus::Pending) {
                EntryStatus::Pending
            } else {
                EntryStatus::Draft
            },
        };

        let entry = self.pool.run(|conn| toil::upsert_entry(conn, &draft))?;
        self.recompute_balance(&user)?;

        let verb = if existing.is_some() { "updated" } else { "saved" };
        self.pool.run(|conn| {
            ttlog(
                conn,
                "toil_add",
                &user,
                &format!(
                    "{} earned {} used {} ({})",
                    format_date(&date),
                    entry.requested_hours,
                    entry.used_hours,
                    verb
                ),
            )
        })?;

        let message = format!(
            "TOIL entry {verb} for {} (earned {}, used {}).",
            format_date(&date),
            entry.requested_hours,
            entry.used_hours
        );
        Ok(Outcome::ok(entry, message))
    }

    /// Delete an entry. A missing id is reported as success.
    pub fn delete_entry(&mut self, actor: &Actor, id: i64) -> AppResult<Outcome<()>> {
        let Some(entry) = self.pool.run(|conn| toil::find_entry(conn, id))? else {
            return Ok(Outcome::done(format!("Entry {id} not found, nothing to delete.")));
        };

        if !actor.can_act_for(&entry.user_id) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: only {} or an administrator can delete entry {id}.",
                entry.user_id
            ))
            .into());
        }
        if entry.status.is_approved() && !actor.is_admin {
            return Ok(Rejection::invalid_state(format!(
                "Entry {id} is approved; only an administrator can delete it."
            ))
            .into());
        }

        self.pool.run(|conn| toil::delete_entry(conn, id))?;
        self.recompute_balance(&entry.user_id)?;

        self.pool.run(|conn| {
            ttlog(
                conn,
                "toil_del",
                &entry.user_id,
                &format!("Deleted entry {id} ({})", format_date(&entry.date)),
            )
        })?;

        Ok(Outcome::done(format!(
            "Entry {id} ({}) deleted.",
            format_date(&entry.date)
        )))
    }

    /// Entries of `user` with an optional inclusive date range.
    pub fn list_entries(
        &mut self,
        actor: &Actor,
        user: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Outcome<Vec<ToilEntry>>> {
        let user = user_key(user);
        if !actor.can_act_for(&user) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: {} cannot view entries of {user}.",
                actor.id
            ))
            .into());
        }

        let entries: Vec<ToilEntry> = self
            .pool
            .run(|conn| toil::list_entries(conn, &user))?
            .into_iter()
            .filter(|e| from.is_none_or(|f| e.date >= f))
            .filter(|e| to.is_none_or(|t| e.date <= t))
            .collect();

        let n = entries.len();
        Ok(Outcome::ok(entries, format!("{n} entries for {user}.")))
    }

    // ---------------------------
    // Balances
    // ---------------------------

    pub fn get_balance(&mut self, actor: &Actor, user: &str) -> AppResult<Outcome<BalanceView>> {
        let user = user_key(user);
        if !actor.can_act_for(&user) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: {} cannot view the balance of {user}.",
                actor.id
            ))
            .into());
        }

        let total = self.balance_minutes(&user)?;
        let entries = self.pool.run(|conn| toil::list_entries(conn, &user))?;
        let pending = pending_delta(&entries);
        let stored = self.pool.run(|conn| toil::load_balance(conn, &user))?;

        let view = BalanceView {
            user_id: user.clone(),
            total_hours: format_duration(total),
            pending_hours: format_duration(pending),
            updated_at: stored.map(|(_, at)| at),
        };
        let message = format!("TOIL balance for {user}: {}", view.total_hours);
        Ok(Outcome::ok(view, message))
    }

    /// Drop both caches and recompute every stored balance. Administrators only.
    pub fn recalculate_all(&mut self, actor: &Actor) -> AppResult<Outcome<Vec<(String, i64)>>> {
        if !actor.is_admin {
            return Ok(Rejection::unauthorized(
                "Not authorized: only administrators can recalculate balances.",
            )
            .into());
        }

        self.settings_cache.clear();
        self.balance_cache.clear();
        let users = self.pool.run(toil::list_toil_users)?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let minutes = self.recompute_balance(&user)?;
            out.push((user, minutes));
        }

        let n = out.len();
        self.pool.run(|conn| {
            ttlog(
                conn,
                "toil_recalc",
                &actor.id,
                &format!("Recalculated {n} balance(s)"),
            )
        })?;
        info!(count = n, "balances recalculated");

        Ok(Outcome::ok(out, format!("Recalculated {n} balance(s).")))
    }

    // ---------------------------
    // Settings
    // ---------------------------

    pub fn get_settings(&mut self, actor: &Actor, user: &str) -> AppResult<Outcome<ToilSettings>> {
        let user = user_key(user);
        if !actor.can_act_for(&user) {
            return Ok(Rejection::unauthorized(format!(
                "Not authorized: {} cannot view the settings of {user}.",
                actor.id
            ))
            .into());
        }
        let settings = self.settings_for(&user)?;
        Ok(Outcome::ok(settings, format!("TOIL settings for {user}.")))
    }

    /// Change the limits of `user`. Administrators only.
    pub fn update_settings(
        &mut self,
        actor: &Actor,
        user: &str,
        patch: &SettingsPatch,
    ) -> AppResult<Outcome<ToilSettings>> {
        let user = user_key(user);
        if !actor.is_admin {
            return Ok(Rejection::unauthorized(
                "Not authorized: only administrators can change TOIL settings.",
            )
            .into());
        }
        if patch.is_empty() {
            return Ok(Outcome::fail(
                FailureKind::Validation,
                "Nothing to update: pass at least one setting.",
            ));
        }

        let mut settings = self.settings_for(&user)?;
        if let Err(e) = apply_patch(&mut settings, patch) {
            return Ok(Outcome::fail(FailureKind::Validation, e.to_string()));
        }
        if !(1..=MAX_STREAK_DAYS).contains(&settings.max_streak_days) {
            return Ok(Outcome::fail(
                FailureKind::Validation,
                format!("max_streak_days must be between 1 and {MAX_STREAK_DAYS}."),
            ));
        }

        self.pool.run(|conn| toil::save_settings(conn, &settings))?;
        self.settings_cache.invalidate(&user);

        self.pool.run(|conn| {
            ttlog(
                conn,
                "toil_settings",
                &user,
                &format!(
                    "capacity {} streak {} over {} day(s)",
                    settings.max_capacity, settings.max_streak_hours, settings.max_streak_days
                ),
            )
        })?;

        Ok(Outcome::ok(
            settings,
            format!("TOIL settings updated for {user}."),
        ))
    }
}

/// Apply `patch`, storing limits in canonical `HH:MM` form.
fn apply_patch(settings: &mut ToilSettings, patch: &SettingsPatch) -> AppResult<()> {
    if let Some(cap) = &patch.max_capacity {
        settings.max_capacity = format_duration(validate_limit(cap)?);
    }
    if let Some(streak) = &patch.max_streak_hours {
        settings.max_streak_hours = format_duration(validate_limit(streak)?);
    }
    if let Some(days) = patch.max_streak_days {
        settings.max_streak_days = days;
    }
    Ok(())
}
