use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form,
};
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use crate::{
    auth::CurrentUser,
    comments::{Comment, CommentForm, CommentResponse},
    error::AppError,
    posts::{AuthorResponse, PostId},
    urls,
};

/// Helper struct for fetching comments with author info from database
#[derive(FromRow)]
struct CommentFromDb {
    id: i64,
    post_id: i64,
    text: String,
    created: chrono::DateTime<chrono::Utc>,
    // Author fields
    author_id: i64,
    username: String,
}

impl From<CommentFromDb> for CommentResponse {
    fn from(c: CommentFromDb) -> Self {
        CommentResponse {
            id: c.id,
            post_id: c.post_id,
            author: AuthorResponse {
                id: c.author_id,
                username: c.username,
            },
            text: c.text,
            created: c.created,
        }
    }
}

/// Add a comment to a post
/// POST /posts/:id/comment/
pub async fn add_comment(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    PostId(post_id): PostId,
    Form(form): Form<CommentForm>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT id FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let form = form.cleaned();
    form.validate()?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (text, author_id, post_id)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&form.text)
    .bind(user.id)
    .bind(post_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::InternalServerError
    })?;

    tracing::info!(
        "comment {} on post {} by {}",
        comment.id,
        comment.post_id,
        user.username
    );

    Ok(Redirect::to(&urls::post_detail(post_id)))
}

/// Comments of a post, oldest first
pub(crate) async fn fetch_comments(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<CommentResponse>, AppError> {
    let comments = sqlx::query_as::<_, CommentFromDb>(
        r#"
        SELECT
            c.id, c.post_id, c.text, c.created,
            u.id as author_id, u.username
        FROM comments c
        JOIN users u ON c.author_id = u.id
        WHERE c.post_id = ?
        ORDER BY c.created ASC, c.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch comments: {:?}", e);
        AppError::InternalServerError
    })?;

    Ok(comments.into_iter().map(CommentResponse::from).collect())
}
