//! Command-line adapter: argument parsing and per-command handlers.
//!
//! Handlers return `Ok(false)` when the business operation was refused, so
//! the binary can tell a failed outcome from an infrastructure error.

pub mod commands;
pub mod parser;

use crate::config::Config;
use crate::core::users::UserLogic;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::range::parse_range;
use crate::models::actor::Actor;
use chrono::NaiveDate;
use parser::Cli;
use tracing::debug;

/// Open the configured database with the configured retry policy and
/// bring its schema up to date.
pub fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::with_policy(&cfg.database, cfg.retry.policy())?;
    let applied = init_db(&pool)?;
    if applied > 0 {
        debug!(applied, "pending migrations applied");
    }
    Ok(pool)
}

/// Identity from `--as`, falling back to `default_user`.
pub fn acting_user(cli: &Cli, cfg: &Config) -> AppResult<String> {
    cli.actor
        .clone()
        .or_else(|| Some(cfg.default_user.clone()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::Config(
                "no acting user: pass --as <email> or set default_user in the configuration"
                    .into(),
            )
        })
}

pub fn resolve_actor(pool: &DbPool, cli: &Cli, cfg: &Config) -> AppResult<Actor> {
    let id = acting_user(cli, cfg)?;
    UserLogic::resolve(pool, &id)
}

/// Optional `--period` into inclusive bounds.
pub fn period_bounds(period: Option<&str>) -> AppResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    match period {
        None => Ok((None, None)),
        Some(p) if p.eq_ignore_ascii_case("all") => Ok((None, None)),
        Some(p) => {
            let (from, to) = parse_range(p)?;
            Ok((Some(from), Some(to)))
        }
    }
}
