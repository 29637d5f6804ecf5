//! Time-boxed cache for rendered index pages.
//!
//! Entries live for a fixed interval after insertion; writes to the store do
//! not evict them, so a page may be stale for up to one interval.

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache as MokaCache;

pub const INDEX_KEY_PREFIX: &str = "index_page";

const MAX_ENTRIES: u64 = 1_000;

#[derive(Clone, Debug)]
pub struct CachedPage {
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
}

impl IntoResponse for CachedPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

#[derive(Clone)]
pub struct PageCache {
    inner: MokaCache<String, CachedPage>,
}

impl PageCache {
    pub fn new(time_to_live: Duration) -> Self {
        Self {
            inner: MokaCache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(time_to_live)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<CachedPage> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, page: CachedPage) {
        self.inner.insert(key, page).await;
    }

    /// Drops every cached page.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

pub fn index_key(request: &Request) -> String {
    format!("{}:{}", INDEX_KEY_PREFIX, request.uri())
}

/// Serves GET requests from the cache, storing successful responses on a miss.
pub async fn cache_index_page(
    State(cache): State<PageCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = index_key(&request);
    if let Some(page) = cache.get(&key).await {
        tracing::debug!("cache hit for {}", key);
        return page.into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to buffer index page: {:?}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    cache
        .insert(
            key,
            CachedPage {
                status: parts.status,
                content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                body: bytes.clone(),
            },
        )
        .await;

    Response::from_parts(parts, Body::from(bytes))
}
