use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use sqlx::SqlitePool;

use crate::{
    auth::{handler::fetch_user, CurrentUser},
    error::AppError,
    pagination::PageQuery,
    posts::{handler::fetch_post_page, ListingResponse, PostScope},
    response::ApiResponse,
    urls,
};

/// Posts of every author the current user follows
/// GET /follow/
pub async fn follow_index(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = fetch_post_page(&pool, PostScope::FollowedBy(user.id), query.page.as_deref()).await?;

    Ok(ApiResponse::success(ListingResponse { page }))
}

/// Follow an author. Following yourself or someone already followed is a no-op.
/// GET|POST /profile/:username/follow/
pub async fn profile_follow(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author = fetch_user(&pool, &username).await?;

    if author.id != user.id {
        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES (?, ?)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(author.id)
        .execute(&pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            tracing::info!("{} now follows {}", user.username, author.username);
        }
    }

    Ok(Redirect::to(&urls::profile(&author.username)))
}

/// Unfollow an author; a no-op when not following.
/// GET|POST /profile/:username/unfollow/
pub async fn profile_unfollow(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let author = fetch_user(&pool, &username).await?;

    let removed = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
        .bind(user.id)
        .bind(author.id)
        .execute(&pool)
        .await?
        .rows_affected();

    if removed > 0 {
        tracing::info!("{} unfollowed {}", user.username, author.username);
    }

    Ok(Redirect::to(urls::FOLLOW_INDEX))
}
