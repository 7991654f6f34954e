//! toil-ledger main entrypoint.

use clap::Parser;
use toil_ledger::cli::parser::Cli;
use toil_ledger::ui::messages::error;
use toil_ledger::{dispatch, load_config};
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing("warn");
            error(e);
            std::process::exit(1);
        }
    };
    init_tracing(&cfg.log_level);

    match dispatch(&cli, &cfg) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            error(e);
            std::process::exit(1);
        }
    }
}
