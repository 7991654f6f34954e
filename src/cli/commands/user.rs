use crate::cli::parser::{Cli, UserCmd};
use crate::cli::{acting_user, open_pool};
use crate::config::Config;
use crate::core::users::UserLogic;
use crate::errors::AppResult;
use crate::ui::messages::{self, info};
use crate::utils::table::Table;

pub fn handle(action: &UserCmd, cli: &Cli, cfg: &Config) -> AppResult<bool> {
    let pool = open_pool(cfg)?;

    match action {
        UserCmd::Add { email, name, admin } => {
            // Registering the first administrator needs no identity.
            let actor = match acting_user(cli, cfg) {
                Ok(id) => Some(UserLogic::resolve(&pool, &id)?),
                Err(_) => None,
            };
            let out = UserLogic::add(&pool, actor.as_ref(), email, name, *admin)?;
            Ok(messages::outcome(&out))
        }
        UserCmd::List => {
            let users = UserLogic::list(&pool)?;
            if users.is_empty() {
                info("No users registered.");
                return Ok(true);
            }
            let mut table = Table::new(["Email", "Name", "Role", "Since"]);
            for u in users {
                table.add_row(vec![
                    u.email,
                    u.name,
                    if u.is_admin { "admin" } else { "user" }.to_string(),
                    u.created_at.chars().take(10).collect(),
                ]);
            }
            print!("{}", table.render());
            Ok(true)
        }
    }
}
