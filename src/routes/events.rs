//! Editor notifications.
//!
//! POST /api/v1/events/saved { path: string }
//!   A document was saved. Cached blame and log results are dropped so the
//!   next query sees the new contents.
//! GET /api/v1/events/cache
//!   Current cache sizes, for diagnostics.

use std::path::PathBuf;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::git::cache::CacheStats;

use super::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/events/saved", post(file_saved))
        .route("/api/v1/events/cache", get(cache_stats))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct FileSaved {
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct CacheReport {
    blame: CacheStats,
    log: CacheStats,
}

async fn file_saved(State(state): State<AppState>, Json(event): Json<FileSaved>) -> StatusCode {
    state.service.notify_file_saved(&event.path);
    StatusCode::NO_CONTENT
}

async fn cache_stats(State(state): State<AppState>) -> Json<CacheReport> {
    let (blame, log) = state.service.cache_stats();
    Json(CacheReport { blame, log })
}
