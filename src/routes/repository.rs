use axum::{Json, Router, extract::State, routing::get};

use crate::error::Result;
use crate::models::RepositoryInfo;

use super::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository", get(get_repository_info))
        .with_state(state)
}

async fn get_repository_info(State(state): State<AppState>) -> Result<Json<RepositoryInfo>> {
    let info = state.service.info(&state.repo_path).await?;
    Ok(Json(info))
}
