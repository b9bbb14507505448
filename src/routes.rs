use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    admin::{self, AdminStatus},
    error::{AppError, AppResult},
    models::{CastEntry, SeasonResult, TitleRecord},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/title", get(title))
        .route("/search", get(search))
        .route("/cast", get(cast))
        .route("/season", get(season))
        .route("/seasons", get(seasons))
        .route("/admin/{command}", post(admin_command))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    imdb_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    #[serde(default)]
    imdb_id: String,
    season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    #[serde(default)]
    param: String,
}

pub async fn title(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TitleQuery>,
) -> AppResult<impl IntoResponse> {
    if q.imdb_id.trim().is_empty() {
        return Err(AppError::invalid("missing query parameter 'imdb_id'"));
    }
    // A failed write-back was already logged; the caller still gets the record.
    let acquired = state.acquirer.acquire_title(&q.imdb_id).await?;
    Ok(([("x-cache", acquired.cache_status())], Json(acquired.record)))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<Vec<TitleRecord>>> {
    if q.title.trim().is_empty() {
        return Err(AppError::invalid("missing query parameter 'title'"));
    }
    Ok(Json(state.acquirer.search_titles(&q.title).await?))
}

pub async fn cast(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TitleQuery>,
) -> AppResult<Json<Vec<CastEntry>>> {
    if q.imdb_id.trim().is_empty() {
        return Err(AppError::invalid("missing query parameter 'imdb_id'"));
    }
    Ok(Json(state.acquirer.acquire_cast(&q.imdb_id).await?))
}

pub async fn season(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SeasonQuery>,
) -> AppResult<Json<SeasonResult>> {
    if q.imdb_id.trim().is_empty() {
        return Err(AppError::invalid("missing query parameter 'imdb_id'"));
    }
    let Some(season) = q.season else {
        return Err(AppError::invalid("missing query parameter 'season'"));
    };
    let season: u32 =
        season.trim().parse().map_err(|_| AppError::invalid("season must be a positive integer"))?;
    Ok(Json(state.acquirer.acquire_season(&q.imdb_id, season).await?))
}

pub async fn seasons(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TitleQuery>,
) -> AppResult<Json<Vec<SeasonResult>>> {
    if q.imdb_id.trim().is_empty() {
        return Err(AppError::invalid("missing query parameter 'imdb_id'"));
    }
    Ok(Json(state.acquirer.acquire_all_seasons(&q.imdb_id).await?))
}

pub async fn admin_command(
    State(state): State<Arc<AppState>>,
    Path(command): Path<String>,
    Query(q): Query<AdminQuery>,
) -> AppResult<Json<AdminStatus>> {
    let status =
        admin::run_admin_command(&state.cache, &state.collection, &command, &q.param).await?;
    Ok(Json(status))
}
