use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use tracing::debug;
use wreq::header::{ACCEPT_LANGUAGE, REFERER};

use crate::error::{AppError, AppResult};

/// Source of raw upstream documents.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

pub struct HttpFetcher {
    client: wreq::Client,
    referer: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpFetcher {
    pub fn new(client: wreq::Client, referer: impl Into<String>, rps: u32) -> Self {
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN),
        )));
        Self { client, referer: referer.into(), limiter }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        self.limiter.until_ready().await;

        debug!(url = %url, "fetching upstream page");
        let resp = self
            .client
            .get(url)
            .header(REFERER, self.referer.as_str())
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|err| AppError::upstream(url, err))?;

        let resp = resp.error_for_status().map_err(|err| AppError::upstream(url, err))?;
        resp.text().await.map_err(|err| AppError::upstream(url, err))
    }
}

/// Canonical upstream locations for each page kind.
#[derive(Clone, Debug)]
pub struct ImdbUrls {
    base: String,
}

impl ImdbUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into().trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn title(&self, imdb_id: &str) -> String {
        format!("{}/title/{}/", self.base, imdb_id)
    }

    pub fn credits(&self, imdb_id: &str) -> String {
        format!("{}/title/{}/fullcredits", self.base, imdb_id)
    }

    pub fn season(&self, imdb_id: &str, season: u32) -> String {
        format!("{}/title/{}/episodes/?season={}", self.base, imdb_id, season)
    }

    pub fn search(&self, query: &str) -> String {
        format!(
            "{}/search/title/?title={}&title_type=feature,tv_series,tv_miniseries",
            self.base,
            urlencoding::encode(query)
        )
    }
}
