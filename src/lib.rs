use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;

pub mod auth;
pub mod cache;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod follows;
pub mod forms;
pub mod groups;
pub mod pagination;
pub mod posts;
pub mod response;
pub mod urls;

use cache::PageCache;
use config::settings::Settings;
use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    settings: Settings,
    cache: PageCache,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        let cache = PageCache::new(settings.index_cache_ttl);
        Self {
            pool,
            settings,
            cache,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> SqlitePool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

impl FromRef<AppState> for PageCache {
    fn from_ref(app_state: &AppState) -> PageCache {
        app_state.cache.clone()
    }
}

pub fn app(app_state: AppState) -> Router {
    let index = get(posts::handler::index).layer(middleware::from_fn_with_state(
        app_state.cache.clone(),
        cache::cache_index_page,
    ));

    let auth_router = Router::new()
        .route(
            "/login/",
            get(auth::handler::login_page).post(auth::handler::login),
        )
        .route("/signup/", post(auth::handler::signup));

    Router::new()
        .route("/", index)
        .route("/group/:slug/", get(posts::handler::group_posts))
        .route("/profile/:username/", get(posts::handler::profile))
        .route(
            "/profile/:username/follow/",
            get(follows::handler::profile_follow).post(follows::handler::profile_follow),
        )
        .route(
            "/profile/:username/unfollow/",
            get(follows::handler::profile_unfollow).post(follows::handler::profile_unfollow),
        )
        .route("/posts/:post_id/", get(posts::handler::post_detail))
        .route(
            "/posts/:post_id/edit/",
            get(posts::handler::post_edit_form).post(posts::handler::post_edit),
        )
        .route(
            "/posts/:post_id/comment/",
            post(comments::handler::add_comment),
        )
        .route(
            "/create/",
            get(posts::handler::post_create_form).post(posts::handler::post_create),
        )
        .route("/follow/", get(follows::handler::follow_index))
        .nest("/auth", auth_router)
        .fallback(not_found)
        .with_state(app_state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}
