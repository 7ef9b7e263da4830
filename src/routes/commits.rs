//! History endpoints.
//!
//! - GET /api/v1/log?ref=<ref>&max_count=<n>&files=<bool>
//!   Commits reachable from `ref` (default HEAD). `files=true` adds each
//!   commit's file statuses.
//! - GET /api/v1/log/file?path=<path>&ref=<ref>&max_count=<n>
//!   History of one file. `path` is absolute or relative to the work tree.
//! - GET /api/v1/stashes
//!
//! `max_count` of 0 or absent means no limit. An unknown ref is a 404.

use std::path::Path;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::git::{GitDataSource, LogDetail};
use crate::git::uri::relative_to;
use crate::models::{Commit, LogResult};

use super::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/log", get(get_log))
        .route("/api/v1/log/file", get(get_file_log))
        .route("/api/v1/stashes", get(get_stashes))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    #[serde(rename = "ref", default = "default_ref")]
    reference: String,
    max_count: Option<usize>,
    #[serde(default)]
    files: bool,
}

#[derive(Debug, Deserialize)]
struct FileLogQuery {
    path: String,
    #[serde(rename = "ref", default = "default_ref")]
    reference: String,
    max_count: Option<usize>,
}

fn default_ref() -> String {
    "HEAD".to_string()
}

async fn get_log(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Result<Json<LogResult>> {
    let detail = if query.files { LogDetail::Files } else { LogDetail::Shallow };
    let log = state
        .service
        .log_for_repo(&state.repo_path, &query.reference, query.max_count, detail)
        .await?
        .ok_or(AppError::CommitNotFound(query.reference))?;
    Ok(Json(log))
}

async fn get_file_log(
    State(state): State<AppState>,
    Query(query): Query<FileLogQuery>,
) -> Result<Json<LogResult>> {
    let path = Path::new(&query.path);
    let file_path = if path.is_absolute() {
        relative_to(path, Path::new(state.repo_path.as_ref()))
    } else {
        query.path.clone()
    };

    let log = state
        .service
        .log_for_file(&state.repo_path, &file_path, &query.reference, query.max_count)
        .await?
        .ok_or(AppError::PathNotFound(query.path))?;
    Ok(Json(log))
}

async fn get_stashes(State(state): State<AppState>) -> Result<Json<Vec<Commit>>> {
    let stashes = state.service.stash_list(&state.repo_path).await?;
    Ok(Json(stashes))
}
