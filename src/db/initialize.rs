use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(pool: &DbPool) -> AppResult<usize> {
    pool.run(run_pending_migrations)
}
