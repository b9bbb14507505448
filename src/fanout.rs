use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::{
    error::{AppError, AppResult},
    extract,
    models::{SeasonResult, TitleRecord},
    processor::Acquirer,
};

/// Upper bound on the season count read from a title page.
const MAX_SEASONS: u32 = 100;

impl Acquirer {
    /// Scrapes the search listing, then acquires every linked title concurrently.
    /// Titles that fail are dropped; the order of the result is unspecified.
    pub async fn search_titles(&self, query: &str) -> AppResult<Vec<TitleRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid("title query is required"));
        }

        let html = self.fetcher.fetch(&self.urls.search(query)).await?;
        let ids = extract::search_result_ids(&html);
        debug!(query = %query, candidates = ids.len(), "parsed search listing");

        let width = self.fan_out_width(ids.len());
        let items: Vec<Option<TitleRecord>> = stream::iter(ids)
            .map(|imdb_id| async move {
                match self.acquire_title(&imdb_id).await {
                    Ok(acquired) => Some(acquired.record),
                    Err(err) => {
                        warn!(imdb_id = %imdb_id, error = %err, "failed to acquire search result");
                        None
                    },
                }
            })
            .buffer_unordered(width)
            .collect()
            .await;

        let results: Vec<TitleRecord> = items.into_iter().flatten().collect();
        debug!(query = %query, results = results.len(), "completed search");
        Ok(results)
    }

    /// Episode listings for every season of a series, in season order.
    pub async fn acquire_all_seasons(&self, imdb_id: &str) -> AppResult<Vec<SeasonResult>> {
        let title = self.acquire_title(imdb_id).await?.record;
        if title.seasons == 0 {
            debug!(imdb_id = %title.imdb_id, "title has no seasons");
            return Ok(Vec::new());
        }

        let count = if title.seasons > MAX_SEASONS {
            warn!(imdb_id = %title.imdb_id, seasons = title.seasons, "implausible season count, capping");
            MAX_SEASONS
        } else {
            title.seasons
        };

        let width = self.fan_out_width(count as usize);
        let imdb_id = title.imdb_id.as_str();
        let items: Vec<Option<SeasonResult>> = stream::iter(1..=count)
            .map(|season| async move {
                match self.acquire_season(imdb_id, season).await {
                    Ok(result) => Some(result),
                    Err(err) => {
                        warn!(imdb_id = %imdb_id, season = season, error = %err, "failed to acquire season");
                        None
                    },
                }
            })
            .buffer_unordered(width)
            .collect()
            .await;

        let mut seasons: Vec<SeasonResult> = items.into_iter().flatten().collect();
        seasons.sort_by_key(|s| s.season);
        Ok(seasons)
    }

    /// Zero means one in-flight acquisition per target.
    fn fan_out_width(&self, targets: usize) -> usize {
        match self.max_concurrent {
            0 => targets.max(1),
            limit => limit,
        }
    }
}
