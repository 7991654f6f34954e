use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<bool> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing toil-ledger…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", cfg.database);

    let pool = DbPool::with_policy(&cfg.database, cfg.retry.policy())?;
    let applied = init_db(&pool)?;

    success(format!(
        "Database initialized at {} ({applied} migration(s) applied)",
        cfg.database
    ));

    // Not fatal: the database is usable even if the audit row is missing.
    if let Err(e) = pool.run(|conn| {
        log::ttlog(
            conn,
            "init",
            "",
            &format!("Database initialized at {}", cfg.database),
        )
    }) {
        warning(format!("Failed to write internal log: {e}"));
    }

    Ok(true)
}
