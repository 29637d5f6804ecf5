//! Canonical locations used as redirect targets.

use axum::http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything but RFC 3986 unreserved characters is escaped, so `/` becomes
/// `%2F` inside a query value or a path segment.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const LOGIN: &str = "/auth/login/";
pub const FOLLOW_INDEX: &str = "/follow/";

pub fn profile(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, COMPONENT))
}

pub fn post_detail(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// Login page that sends the user back to `target` afterwards.
pub fn login(target: &Uri) -> String {
    let next = target
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| target.path());
    format!("{}?next={}", LOGIN, utf8_percent_encode(next, COMPONENT))
}
