use crate::cli::parser::{Cli, Commands};
use crate::cli::{open_pool, resolve_actor};
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportOptions};
use crate::ui::messages;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, cli: &Cli, cfg: &Config) -> AppResult<bool> {
    let Commands::Export {
        data,
        format,
        file,
        range,
        user,
        project,
        task,
        by_task,
        force,
    } = cmd
    else {
        return Ok(true);
    };

    let pool = open_pool(cfg)?;
    let actor = resolve_actor(&pool, cli, cfg)?;

    let opts = ExportOptions {
        data: *data,
        format: *format,
        file: expand_tilde(file),
        range: range.clone(),
        user: user.clone(),
        project: project.clone(),
        task: task.clone(),
        by_task: *by_task,
        force: *force,
    };

    let out = ExportLogic::export(&pool, &actor, &opts)?;
    if out.success {
        Ok(true)
    } else {
        Ok(messages::outcome(&out))
    }
}
