use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_DATABASE_URL: &str = "sqlite://yatube.db?mode=rwc";

#[derive(Clone)]
pub struct Settings {
    pub port: u16,
    pub addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    /// Lifetime of a cached index page.
    pub index_cache_ttl: Duration,
    pub token_ttl: chrono::Duration,
}

impl Settings {
    pub fn new() -> anyhow::Result<Self> {
        let port: u16 = env_or("PORT", 3000);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let index_cache_ttl = Duration::from_secs(env_or("INDEX_CACHE_SECONDS", 20));
        let token_ttl = token_ttl(env_or("TOKEN_TTL_MINUTES", 60))?;

        Ok(Self {
            port,
            addr,
            database_url,
            jwt_secret,
            index_cache_ttl,
            token_ttl,
        })
    }
}

fn token_ttl(minutes: i64) -> anyhow::Result<chrono::Duration> {
    chrono::Duration::try_minutes(minutes).context("TOKEN_TTL_MINUTES out of range")
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
