use serde::Serialize;

/// The identity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: true,
        }
    }

    pub fn is(&self, user_id: &str) -> bool {
        self.id.eq_ignore_ascii_case(user_id)
    }

    /// Users manage their own records; admins may act for anyone.
    pub fn can_act_for(&self, user_id: &str) -> bool {
        self.is_admin || self.is(user_id)
    }
}

/// Canonical form of a user id (emails compare case-insensitively).
pub fn user_key(id: &str) -> String {
    id.trim().to_lowercase()
}
