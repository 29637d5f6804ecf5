#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use yatube::{auth::jwt, cache::PageCache, config::settings::Settings, db, AppState};

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub pool: SqlitePool,
    pub cache: PageCache,
    router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let pool = db::connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        let settings = Settings {
            port: 0,
            addr: ([127, 0, 0, 1], 0).into(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: SECRET.to_string(),
            index_cache_ttl: Duration::from_secs(20),
            token_ttl: chrono::Duration::minutes(5),
        };

        let state = AppState::new(pool.clone(), settings);
        let cache = state.cache().clone();

        Self {
            pool,
            cache,
            router: yatube::app(state),
        }
    }

    /// Inserts a user that can only authenticate by token.
    pub async fn create_user(&self, username: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES (?, '!') RETURNING id")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub fn token_for(&self, user_id: i64) -> String {
        jwt::create_token(user_id, SECRET, chrono::Duration::minutes(5)).unwrap()
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO post_groups (title, slug, description) VALUES (?, ?, 'description') RETURNING id",
        )
        .bind(title)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn create_post(&self, author_id: i64, text: &str, group_id: Option<i64>) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO posts (text, author_id, group_id) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(text)
        .bind(author_id)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut request = Request::get(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, token: Option<&str>) -> Response {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Target of a redirect response.
pub fn location(response: &Response) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
        .to_string()
}
