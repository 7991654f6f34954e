//! User registry and identity resolution.

use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::users::{find_user, list_users, upsert_user};
use crate::errors::AppResult;
use crate::models::actor::{Actor, user_key};
use crate::models::outcome::{Outcome, Rejection};
use crate::models::user::User;

pub struct UserLogic;

impl UserLogic {
    /// Actor for `id`; identities missing from the users table act as plain users.
    pub fn resolve(pool: &DbPool, id: &str) -> AppResult<Actor> {
        let key = user_key(id);
        Ok(match pool.run(|conn| find_user(conn, &key))? {
            Some(u) => Actor {
                id: user_key(&u.email),
                is_admin: u.is_admin,
            },
            None => Actor::user(key),
        })
    }

    /// Add or update a user.
    ///
    /// While no administrator exists anyone may register users, so the
    /// first administrator can be created; afterwards only administrators can.
    pub fn add(
        pool: &DbPool,
        actor: Option<&Actor>,
        email: &str,
        name: &str,
        is_admin: bool,
    ) -> AppResult<Outcome<User>> {
        let email = user_key(email);
        if email.is_empty() || !email.contains('@') {
            return Ok(Rejection::validation(format!("Invalid email address '{email}'.")).into());
        }

        let has_admin = pool
            .run(|conn| list_users(conn))?
            .iter()
            .any(|u| u.is_admin);
        if has_admin && !actor.is_some_and(|a| a.is_admin) {
            return Ok(
                Rejection::unauthorized("Not authorized: only administrators can manage users.")
                    .into(),
            );
        }

        pool.run(|conn| {
            upsert_user(conn, &email, name.trim(), is_admin)?;
            ttlog(
                conn,
                "user_add",
                &email,
                if is_admin { "administrator" } else { "user" },
            )
        })?;

        match pool.run(|conn| find_user(conn, &email))? {
            Some(u) => {
                let role = if u.is_admin { "administrator" } else { "user" };
                let message = format!("{} saved as {role}.", u.email);
                Ok(Outcome::ok(u, message))
            }
            None => Ok(Rejection::not_found(format!("User {email} not found.")).into()),
        }
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<User>> {
        pool.run(list_users)
    }
}
