//! toil-ledger library root.
//! Exposes the CLI parser, the dispatcher and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

pub use crate::core::timesheet::TimesheetLogic;
pub use crate::core::toil::ToilService;

use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher.
///
/// `Ok(false)` means the command ran but its business operation was refused.
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<bool> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::User { action } => cli::commands::user::handle(action, cli, cfg),
        Commands::Toil { action } => cli::commands::toil::handle(action, cli, cfg),
        Commands::Hours { action } => cli::commands::hours::handle(action, cli, cfg),
        Commands::Timesheet { action } => cli::commands::timesheet::handle(action, cli, cfg),
        Commands::Notifications { .. } => {
            cli::commands::notifications::handle(&cli.command, cli, cfg)
        }
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cli, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
    }
}

/// Load the configuration once and apply command-line overrides.
pub fn load_config(cli: &Cli) -> AppResult<Config> {
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    Ok(cfg)
}
