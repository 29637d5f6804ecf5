use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    auth::{handler::fetch_user, CurrentUser},
    comments::{handler::fetch_comments, CommentFormData},
    error::AppError,
    groups,
    pagination::{Page, PageQuery, PageWindow, PAGE_SIZE},
    posts::{
        AuthorResponse, GroupListingResponse, GroupSummary, ListingResponse, Post,
        PostDetailResponse, PostForm, PostFormData, PostFormResponse, PostId, PostResponse,
        PostScope, ProfileResponse,
    },
    response::ApiResponse,
    urls,
};

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.text, p.image, p.pub_date,
        u.id as author_id, u.username,
        g.id as group_id, g.title as group_title, g.slug as group_slug
    FROM posts p
    JOIN users u ON p.author_id = u.id
    LEFT JOIN post_groups g ON p.group_id = g.id
"#;

/// GET /
pub async fn index(
    State(pool): State<SqlitePool>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = fetch_post_page(&pool, PostScope::All, query.page.as_deref()).await?;

    Ok(ApiResponse::success(ListingResponse { page }))
}

/// GET /group/:slug/
pub async fn group_posts(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let group = groups::find_by_slug(&pool, &slug).await?;
    let page = fetch_post_page(&pool, PostScope::Group(group.id), query.page.as_deref()).await?;

    Ok(ApiResponse::success(GroupListingResponse { group, page }))
}

/// GET /profile/:username/
pub async fn profile(
    State(pool): State<SqlitePool>,
    viewer: Option<CurrentUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let author = fetch_user(&pool, &username).await?;
    let page = fetch_post_page(&pool, PostScope::Author(author.id), query.page.as_deref()).await?;

    let following = match viewer {
        Some(viewer) => {
            sqlx::query("SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?")
                .bind(viewer.id)
                .bind(author.id)
                .fetch_optional(&pool)
                .await?
                .is_some()
        }
        None => false,
    };

    Ok(ApiResponse::success(ProfileResponse {
        author: AuthorResponse {
            id: author.id,
            username: author.username,
        },
        posts_count: page.count,
        following,
        page,
    }))
}

/// GET /posts/:id/
pub async fn post_detail(
    State(pool): State<SqlitePool>,
    PostId(post_id): PostId,
) -> Result<impl IntoResponse, AppError> {
    let post = fetch_post_response(&pool, post_id).await?;

    let posts_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
        .bind(post.author.id)
        .fetch_one(&pool)
        .await?;

    let comments = fetch_comments(&pool, post_id).await?;

    Ok(ApiResponse::success(PostDetailResponse {
        post,
        posts_count,
        form: CommentFormData::default(),
        comments,
    }))
}

/// GET /create/
pub async fn post_create_form(
    State(pool): State<SqlitePool>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(ApiResponse::success(PostFormResponse {
        form: PostFormData::default(),
        groups: groups::list_all(&pool).await?,
        is_edit: false,
    }))
}

/// POST /create/
pub async fn post_create(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let form = form.cleaned();
    let group_id = validate_post_form(&pool, &form).await?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&form.text)
    .bind(user.id)
    .bind(group_id)
    .bind(&form.image)
    .fetch_one(&pool)
    .await?;

    tracing::info!("post {} \"{}\" created by {}", post.id, post, user.username);

    Ok(Redirect::to(&urls::profile(&user.username)).into_response())
}

/// GET /posts/:id/edit/
pub async fn post_edit_form(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    PostId(post_id): PostId,
) -> Result<Response, AppError> {
    let post = fetch_post(&pool, post_id).await?;

    if post.author_id != user.id {
        return Ok(Redirect::to(&urls::post_detail(post_id)).into_response());
    }

    Ok(ApiResponse::success(PostFormResponse {
        form: PostFormData::from(&post),
        groups: groups::list_all(&pool).await?,
        is_edit: true,
    })
    .into_response())
}

/// POST /posts/:id/edit/
///
/// Non-authors are sent to the read-only detail page and nothing changes.
pub async fn post_edit(
    State(pool): State<SqlitePool>,
    user: CurrentUser,
    PostId(post_id): PostId,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let post = fetch_post(&pool, post_id).await?;

    if post.author_id != user.id {
        tracing::info!(
            "user {} tried to edit post {} owned by another author",
            user.username,
            post_id
        );
        return Ok(Redirect::to(&urls::post_detail(post_id)).into_response());
    }

    let form = form.cleaned();
    let group_id = validate_post_form(&pool, &form).await?;

    sqlx::query("UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ?")
        .bind(&form.text)
        .bind(group_id)
        .bind(&form.image)
        .bind(post_id)
        .execute(&pool)
        .await?;

    tracing::info!("post {} edited by {}", post_id, user.username);

    Ok(Redirect::to(&urls::post_detail(post_id)).into_response())
}

/// Runs the field rules and resolves the chosen group, collecting every
/// field error before giving up.
async fn validate_post_form(pool: &SqlitePool, form: &PostForm) -> Result<Option<i64>, AppError> {
    let mut errors = match form.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    let group_id = match form.group.as_deref() {
        None => None,
        Some(raw) => {
            let found = match raw.parse::<i64>() {
                Ok(id) => groups::find_by_id(pool, id).await?,
                Err(_) => None,
            };
            if found.is_none() {
                errors.add(
                    "group",
                    ValidationError::new("invalid_choice")
                        .with_message("Select a valid choice.".into()),
                );
            }
            found.map(|group| group.id)
        }
    };

    if errors.is_empty() {
        Ok(group_id)
    } else {
        Err(AppError::Validation(errors))
    }
}

async fn fetch_post(pool: &SqlitePool, post_id: i64) -> Result<Post, AppError> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))
}

/// One newest-first page of the posts in `scope`.
pub(crate) async fn fetch_post_page(
    pool: &SqlitePool,
    scope: PostScope,
    requested: Option<&str>,
) -> Result<Page<PostResponse>, AppError> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
    scope.push_filter(&mut count_query);
    let count: i64 = count_query.build_query_scalar::<i64>().fetch_one(pool).await?;

    let window = PageWindow::new(count, PAGE_SIZE, requested);

    let mut query = QueryBuilder::<Sqlite>::new(POST_SELECT);
    scope.push_filter(&mut query);
    query
        .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
        .push_bind(window.limit())
        .push(" OFFSET ")
        .push_bind(window.offset());

    let rows = query
        .build_query_as::<PostFromDb>()
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Post listing error ({:?}): {:?}", scope, e);
            AppError::InternalServerError
        })?;

    let items = rows.into_iter().map(PostResponse::from).collect();

    Ok(Page::new(window, items))
}

// Helper struct and function
#[derive(FromRow)]
struct PostFromDb {
    id: i64,
    text: String,
    image: Option<String>,
    pub_date: chrono::DateTime<chrono::Utc>,
    // author fields
    author_id: i64,
    username: String,
    // group fields, all NULL for posts without a group
    group_id: Option<i64>,
    group_title: Option<String>,
    group_slug: Option<String>,
}

impl From<PostFromDb> for PostResponse {
    fn from(p: PostFromDb) -> Self {
        let group = match (p.group_id, p.group_title, p.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(GroupSummary { id, title, slug }),
            _ => None,
        };

        PostResponse {
            id: p.id,
            text: p.text,
            image: p.image,
            pub_date: p.pub_date,
            author: AuthorResponse {
                id: p.author_id,
                username: p.username,
            },
            group,
        }
    }
}

async fn fetch_post_response(pool: &SqlitePool, post_id: i64) -> Result<PostResponse, AppError> {
    let mut query = QueryBuilder::<Sqlite>::new(POST_SELECT);
    query.push(" WHERE p.id = ").push_bind(post_id);

    let row = query
        .build_query_as::<PostFromDb>()
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(PostResponse::from(row))
}
