use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    cache::CacheManager,
    error::{AppError, AppResult},
    extract,
    fetcher::{Fetcher, ImdbUrls},
    models::{CastEntry, SeasonResult, TitleRecord},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    Cache,
    Upstream,
}

/// Outcome of a single title acquisition. A failed write-back does not discard a
/// successful fetch; the error travels alongside the fresh record.
#[derive(Debug)]
pub struct Acquisition {
    pub record: TitleRecord,
    pub origin: Origin,
    pub store_error: Option<AppError>,
}

impl Acquisition {
    pub fn cache_status(&self) -> &'static str {
        match (self.origin, &self.store_error) {
            (Origin::Cache, _) => "hit",
            (Origin::Upstream, None) => "miss",
            (Origin::Upstream, Some(_)) => "miss-unstored",
        }
    }
}

#[derive(Clone)]
pub struct Acquirer {
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) cache: CacheManager,
    pub(crate) urls: ImdbUrls,
    pub(crate) collection: String,
    pub(crate) max_concurrent: usize,
}

impl Acquirer {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: CacheManager,
        urls: ImdbUrls,
        collection: impl Into<String>,
        max_concurrent: usize,
    ) -> Self {
        Self { fetcher, cache, urls, collection: collection.into(), max_concurrent }
    }

    /// Cache-aside acquisition of one title.
    pub async fn acquire_title(&self, imdb_id: &str) -> AppResult<Acquisition> {
        let imdb_id = required_id(imdb_id)?;

        if let Some(record) = self.cache.lookup(&self.collection, imdb_id).await? {
            debug!(imdb_id = %imdb_id, "serving cached title");
            return Ok(Acquisition { record, origin: Origin::Cache, store_error: None });
        }

        debug!(imdb_id = %imdb_id, "cache miss, scraping title page");
        let html = self.fetcher.fetch(&self.urls.title(imdb_id)).await?;

        let mut record = extract::title_record(&html, imdb_id);
        record.expire_at = Some(self.cache.expiry_from_now());

        let store_error = match self.cache.upsert(&self.collection, &record).await {
            Ok(()) => None,
            Err(err) => {
                warn!(imdb_id = %imdb_id, error = %err, "failed to cache title");
                Some(err)
            },
        };

        Ok(Acquisition { record, origin: Origin::Upstream, store_error })
    }

    pub async fn acquire_cast(&self, imdb_id: &str) -> AppResult<Vec<CastEntry>> {
        let imdb_id = required_id(imdb_id)?;
        let html = self.fetcher.fetch(&self.urls.credits(imdb_id)).await?;
        let cast = extract::cast_entries(&html, imdb_id);
        debug!(imdb_id = %imdb_id, cast = cast.len(), "scraped cast");
        Ok(cast)
    }

    pub async fn acquire_season(&self, imdb_id: &str, season: u32) -> AppResult<SeasonResult> {
        let imdb_id = required_id(imdb_id)?;
        if season == 0 {
            return Err(AppError::invalid("season numbers start at 1"));
        }

        let html = self.fetcher.fetch(&self.urls.season(imdb_id, season)).await?;
        let episodes = extract::season_episodes(&html);
        debug!(imdb_id = %imdb_id, season = season, episodes = episodes.len(), "scraped season");

        Ok(SeasonResult { imdb_id: imdb_id.to_string(), season, episodes })
    }
}

fn required_id(imdb_id: &str) -> AppResult<&str> {
    let imdb_id = imdb_id.trim();
    if imdb_id.is_empty() {
        return Err(AppError::invalid("imdb_id is required"));
    }
    Ok(imdb_id)
}
