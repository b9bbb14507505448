use std::time::Duration;

use anyhow::Context;
use jiff::{SignedDuration, Timestamp};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{debug, info, warn};

use crate::{
    entities::title_cache,
    error::{AppError, AppResult},
    models::TitleRecord,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PurgeFilter {
    /// Every record in the collection.
    All,
    /// Records whose expiry is at or before the given unix second.
    ExpiredBefore(i64),
}

const MAX_TTL_DAYS: i64 = 36_500;

#[derive(Clone)]
pub struct CacheManager {
    db: DatabaseConnection,
    ttl_seconds: i64,
}

impl CacheManager {
    /// `ttl_days` is clamped to between one day and a century.
    pub fn new(db: DatabaseConnection, ttl_days: i64) -> Self {
        Self { db, ttl_seconds: ttl_days.clamp(1, MAX_TTL_DAYS) * 86_400 }
    }

    /// Connectivity check run once before serving.
    pub async fn probe(&self) -> AppResult<()> {
        self.db.ping().await?;
        Ok(())
    }

    pub fn expiry_from_now(&self) -> Timestamp {
        Timestamp::now()
            .checked_add(SignedDuration::from_secs(self.ttl_seconds))
            .unwrap_or(Timestamp::MAX)
    }

    /// Point read. Rows past their expiry are treated as absent even before the
    /// reaper removes them.
    pub async fn lookup(&self, collection: &str, imdb_id: &str) -> AppResult<Option<TitleRecord>> {
        let row = title_cache::Entity::find_by_id((collection.to_string(), imdb_id.to_string()))
            .one(&self.db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        if row.expires_at <= now_sec() {
            debug!(collection = %collection, imdb_id = %imdb_id, "cached record expired");
            return Ok(None);
        }

        match serde_json::from_str(&row.payload) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(collection = %collection, imdb_id = %imdb_id, error = %err, "unreadable cached record");
                Ok(None)
            },
        }
    }

    pub async fn upsert(&self, collection: &str, record: &TitleRecord) -> AppResult<()> {
        let expires_at = record
            .expire_at
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("record {} has no expiry", record.imdb_id)))?;
        let payload = serde_json::to_string(record).context("serialize title record")?;

        let model = title_cache::ActiveModel {
            collection: Set(collection.to_string()),
            imdb_id: Set(record.imdb_id.clone()),
            payload: Set(payload),
            expires_at: Set(expires_at.as_second()),
            updated_at: Set(now_sec()),
        };

        title_cache::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    title_cache::Column::Collection,
                    title_cache::Column::ImdbId,
                ])
                .update_columns([
                    title_cache::Column::Payload,
                    title_cache::Column::ExpiresAt,
                    title_cache::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Bulk delete, returning the number of rows removed.
    pub async fn purge(&self, collection: &str, filter: PurgeFilter) -> AppResult<u64> {
        let mut query = title_cache::Entity::delete_many()
            .filter(title_cache::Column::Collection.eq(collection));
        if let PurgeFilter::ExpiredBefore(cutoff) = filter {
            query = query.filter(title_cache::Column::ExpiresAt.lte(cutoff));
        }

        let res = query.exec(&self.db).await?;
        debug!(collection = %collection, filter = ?filter, deleted = res.rows_affected, "purged cache");
        Ok(res.rows_affected)
    }

    /// Periodically deletes expired rows from `collection`, standing in for a
    /// document store's TTL index.
    pub fn spawn_reaper(&self, collection: String, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match cache.purge(&collection, PurgeFilter::ExpiredBefore(now_sec())).await {
                    Ok(0) => {},
                    Ok(deleted) => info!(collection = %collection, deleted = deleted, "reaped expired records"),
                    Err(err) => warn!(collection = %collection, error = %err, "cache reaper failed"),
                }
            }
        })
    }

    #[cfg(test)]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[cfg(test)]
    pub async fn count(&self, collection: &str) -> u64 {
        use sea_orm::PaginatorTrait;

        title_cache::Entity::find()
            .filter(title_cache::Column::Collection.eq(collection))
            .count(&self.db)
            .await
            .unwrap()
    }
}

fn now_sec() -> i64 {
    Timestamp::now().as_second()
}
