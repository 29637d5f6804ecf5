use std::fmt;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use validator::Validate;

use crate::{
    comments::{CommentFormData, CommentResponse},
    error::AppError,
    forms,
    groups::Group,
    pagination::Page,
};

pub mod handler;

/// Characters of the text a post displays as.
const DISPLAY_LEN: usize = 15;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.text.chars().take(DISPLAY_LEN).collect();
        f.write_str(&short)
    }
}

/// Id segment of `/posts/:post_id/...`.
///
/// Only plain decimal ids address a post; anything else is an unknown page.
#[derive(Debug, Clone, Copy)]
pub struct PostId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let not_found = || AppError::NotFound("Post not found".to_string());

        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found())?;

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(not_found());
        }
        raw.parse().map(PostId).map_err(|_| not_found())
    }
}

/// Submitted by the create and edit pages.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    /// Raw group id; checked against the store by the handler.
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "forms::empty_string_as_none")]
    pub image: Option<String>,
}

impl PostForm {
    pub fn cleaned(self) -> Self {
        Self {
            text: forms::clean_text(&self.text),
            ..self
        }
    }
}

/// Form values echoed back to the create/edit page.
#[derive(Debug, Default, Serialize)]
pub struct PostFormData {
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<String>,
}

impl From<&Post> for PostFormData {
    fn from(post: &Post) -> Self {
        PostFormData {
            text: post.text.clone(),
            group: post.group_id,
            image: post.image.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub form: PostFormData,
    pub groups: Vec<Group>,
    pub is_edit: bool,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: chrono::DateTime<chrono::Utc>,
    pub author: AuthorResponse,
    pub group: Option<GroupSummary>,
}

#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub page: Page<PostResponse>,
}

#[derive(Debug, Serialize)]
pub struct GroupListingResponse {
    pub group: Group,
    pub page: Page<PostResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub author: AuthorResponse,
    pub posts_count: i64,
    /// Whether the viewer follows this author; false for guests.
    pub following: bool,
    pub page: Page<PostResponse>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub posts_count: i64,
    /// Blank comment form shown under the post.
    pub form: CommentFormData,
    pub comments: Vec<CommentResponse>,
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows.
    FollowedBy(i64),
}

impl PostScope {
    pub(crate) fn push_filter(self, query: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            PostScope::All => {}
            PostScope::Group(group_id) => {
                query.push(" WHERE p.group_id = ").push_bind(group_id);
            }
            PostScope::Author(author_id) => {
                query.push(" WHERE p.author_id = ").push_bind(author_id);
            }
            PostScope::FollowedBy(user_id) => {
                query
                    .push(" WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ")
                    .push_bind(user_id)
                    .push(")");
            }
        }
    }
}
