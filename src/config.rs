use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub cache_ttl_days: i64,
    pub collection: String,
    pub imdb_base_url: String,
    pub upstream_rps: u32,
    /// Fan-out width for search and season listings. Zero means unbounded.
    pub max_concurrent: usize,
    pub reaper_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8080".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://reelcache.db?mode=rwc".to_string());

        let cache_ttl_days: i64 =
            std::env::var("CACHE_TTL_DAYS").ok().and_then(|s| s.parse().ok()).unwrap_or(7);

        let collection = std::env::var("CACHE_COLLECTION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "titles".to_string());

        let imdb_base_url = std::env::var("IMDB_BASE_URL")
            .unwrap_or_else(|_| "https://www.imdb.com".to_string());

        let upstream_rps: u32 =
            std::env::var("UPSTREAM_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(8);

        let max_concurrent: usize =
            std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|s| s.parse().ok()).unwrap_or(0);

        let reaper_interval_secs: u64 =
            std::env::var("REAPER_INTERVAL_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(3600);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            cache_ttl_days,
            collection,
            imdb_base_url,
            upstream_rps,
            max_concurrent,
            reaper_interval_secs: reaper_interval_secs.max(1),
        })
    }
}
