use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::{
        jwt, utils, AuthResponse, LoginPrompt, LoginPromptResponse, LoginUser, RegisterUser, User,
        UserResponse,
    },
    config::settings::Settings,
    error::AppError,
    response::ApiResponse,
};

pub async fn signup(
    State(pool): State<SqlitePool>,
    State(settings): State<Settings>,
    Json(payload): Json<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    let payload = RegisterUser {
        username: payload.username.trim().to_string(),
        ..payload
    };
    payload.validate()?;

    let password_hash =
        utils::hash_password(&payload.password).map_err(|_| AppError::InternalServerError)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING *",
    )
    .bind(&payload.username)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await
    .map_err(|e: sqlx::Error| {
        let duplicate = e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if duplicate {
            AppError::Conflict("Username already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!("user {} signed up", user.username);

    let token = jwt::create_token(user.id, &settings.jwt_secret, settings.token_ttl)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
    .created())
}

/// Where guests land when they hit a protected route.
pub async fn login_page(Query(prompt): Query<LoginPrompt>) -> impl IntoResponse {
    ApiResponse::success_with_message(
        "Authentication required".to_string(),
        LoginPromptResponse { next: prompt.next },
    )
}

pub async fn login(
    State(pool): State<SqlitePool>,
    State(settings): State<Settings>,
    Json(payload): Json<LoginUser>,
) -> Result<impl IntoResponse, AppError> {
    let payload = LoginUser {
        username: payload.username.trim().to_string(),
        ..payload
    };
    payload.validate()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&payload.username)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    utils::verify_password(&user.password_hash, &payload.password)
        .map_err(|_| AppError::Unauthorized)?;

    let token = jwt::create_token(user.id, &settings.jwt_secret, settings.token_ttl)
        .map_err(|_| AppError::InternalServerError)?;

    Ok(ApiResponse::success(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Looks up a profile owner by username.
pub(crate) async fn fetch_user(pool: &SqlitePool, username: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}
