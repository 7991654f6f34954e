use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub email: String, // ⇔ users.email (primary key)
    pub name: String,
    pub is_admin: bool,
    pub created_at: String,
}
