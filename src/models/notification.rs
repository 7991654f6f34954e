use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub created_at: String,
    pub read: bool,
}
