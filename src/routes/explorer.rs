//! History tree endpoints.
//!
//! - GET /api/v1/explorer/branches
//!   One collapsed item per branch, locals first.
//! - GET /api/v1/explorer/branches/{name}/children?all=<bool>
//!   Commits of the branch, newest first. Ends with a "Show All Commits" item
//!   when the listing was cut at the configured depth. `all=true` lists the
//!   whole history. Branch names containing `/` must be percent-encoded.
//! - GET /api/v1/explorer/commits/{sha}/children
//!   One item per file the commit changed, each carrying a previous-revision
//!   comparison command.
//!
//! Nodes are built per request; every expansion re-reads the history.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::explorer::{self, BranchHistoryNode, CommitNode, NodeView};
use crate::git::{GitDataSource, LogDetail};

use super::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/explorer/branches", get(get_branches))
        .route("/api/v1/explorer/branches/{name}/children", get(get_branch_children))
        .route("/api/v1/explorer/commits/{sha}/children", get(get_commit_children))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BranchChildrenQuery {
    #[serde(default)]
    all: bool,
}

async fn get_branches(State(state): State<AppState>) -> Result<Json<Vec<NodeView>>> {
    let roots =
        explorer::root_nodes(state.service.as_ref(), &state.repo_path, &state.explorer).await?;
    Ok(Json(roots.iter().map(|node| node.view(&state.explorer)).collect()))
}

async fn get_branch_children(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<BranchChildrenQuery>,
) -> Result<Json<Vec<NodeView>>> {
    let branches = state.service.branches(&state.repo_path).await?;
    let branch = branches
        .into_iter()
        .find(|b| b.name == name)
        .ok_or_else(|| AppError::PathNotFound(format!("branch {name}")))?;

    let mut node = BranchHistoryNode::new(branch, state.repo_path.as_ref(), &state.explorer);
    if query.all {
        node.show_all();
    }
    let children = node.get_children(state.service.as_ref()).await?;
    Ok(Json(children.iter().map(|child| child.view(&state.explorer)).collect()))
}

async fn get_commit_children(
    State(state): State<AppState>,
    Path(sha): Path<String>,
) -> Result<Json<Vec<NodeView>>> {
    let commit = state
        .service
        .log_for_repo(&state.repo_path, &sha, Some(1), LogDetail::Shallow)
        .await?
        .and_then(|log| log.commits.into_values().next())
        .ok_or_else(|| AppError::CommitNotFound(sha.clone()))?;

    let mut node = CommitNode::new(commit, None);
    let children = node.get_children(state.service.as_ref()).await?;
    Ok(Json(children.iter().map(|child| child.view(&state.explorer)).collect()))
}
