use crate::cli::parser::{Cli, Commands};
use crate::cli::{open_pool, resolve_actor};
use crate::config::Config;
use crate::core::timesheet::TimesheetLogic;
use crate::errors::AppResult;
use crate::ui::messages::{self, info};

pub fn handle(cmd: &Commands, cli: &Cli, cfg: &Config) -> AppResult<bool> {
    let Commands::Notifications { unread, mark_read } = cmd else {
        return Ok(true);
    };

    let pool = open_pool(cfg)?;
    let actor = resolve_actor(&pool, cli, cfg)?;
    let mut logic = TimesheetLogic::new(pool);

    let out = logic.notifications(&actor, *unread, *mark_read)?;
    if !out.success {
        return Ok(messages::outcome(&out));
    }

    let list = out.data.unwrap_or_default();
    if list.is_empty() {
        info("No notifications.");
    }
    for n in list {
        let marker = if n.read { " " } else { "•" };
        println!(
            "{marker} [{}] {}",
            n.created_at.chars().take(16).collect::<String>(),
            n.message
        );
    }
    Ok(true)
}
