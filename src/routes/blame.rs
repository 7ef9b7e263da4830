//! Blame endpoint.
//!
//! GET /api/v1/blame?uri=<revision uri or path>&line=<zero-based line>
//!
//! `line` is in blame coordinates: the uri's offset is not applied here.
//! Returns the BlameLine, or 404 when the file is untracked or the line
//! does not exist.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::git::{GitDataSource, RevisionUri};
use crate::models::BlameLine;

use super::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new().route("/api/v1/blame", get(get_blame)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct BlameQuery {
    uri: String,
    #[serde(default)]
    line: u32,
}

async fn get_blame(
    State(state): State<AppState>,
    Query(query): Query<BlameQuery>,
) -> Result<Json<BlameLine>> {
    let uri = RevisionUri::from_uri(&query.uri, state.service.as_ref()).await?;
    let blame = state
        .service
        .blame_for_line(&uri, query.line)
        .await?
        .ok_or_else(|| AppError::NotUnderSourceControl(uri.absolute_path().display().to_string()))?;
    Ok(Json(blame))
}
