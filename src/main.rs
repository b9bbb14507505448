mod admin;
mod cache;
mod config;
mod db;
mod entities;
mod error;
mod extract;
mod fanout;
mod fetcher;
mod ids;
mod models;
mod processor;
mod routes;
#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    cache::CacheManager,
    config::Config,
    fetcher::{HttpFetcher, ImdbUrls},
    processor::Acquirer,
};

pub struct AppState {
    pub acquirer: Acquirer,
    pub cache: CacheManager,
    pub collection: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelcache=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = wreq::Client::builder()
        .emulation(wreq_util::Emulation::Firefox136)
        .timeout(Duration::from_secs(30))
        .build()?;

    let urls = ImdbUrls::new(config.imdb_base_url.clone());
    let fetcher = HttpFetcher::new(http, format!("{}/", urls.base()), config.upstream_rps);

    let db = db::connect_and_migrate(&config.database_url)
        .await
        .context("unable to connect to the database")?;
    let cache = CacheManager::new(db, config.cache_ttl_days);
    cache.probe().await.context("database probe failed")?;
    cache.spawn_reaper(config.collection.clone(), Duration::from_secs(config.reaper_interval_secs));

    let acquirer = Acquirer::new(
        Arc::new(fetcher),
        cache.clone(),
        urls,
        config.collection.clone(),
        config.max_concurrent,
    );

    let state = Arc::new(AppState { acquirer, cache, collection: config.collection.clone() });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, collection = %config.collection, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
