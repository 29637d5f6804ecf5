use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::AppError;

/// A community posts may be published to.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Group, AppError> {
    sqlx::query_as::<_, Group>("SELECT * FROM post_groups WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Group not found".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Group>, AppError> {
    Ok(
        sqlx::query_as::<_, Group>("SELECT * FROM post_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Choices offered by the post form.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Group>, AppError> {
    Ok(
        sqlx::query_as::<_, Group>("SELECT * FROM post_groups ORDER BY title ASC")
            .fetch_all(pool)
            .await?,
    )
}
