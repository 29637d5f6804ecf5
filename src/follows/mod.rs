use serde::{Deserialize, Serialize};

pub mod handler;

/// Database model for a follow relationship: `user_id` follows `author_id`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Follow {
    pub id: i64,
    pub user_id: i64,
    pub author_id: i64,
}
