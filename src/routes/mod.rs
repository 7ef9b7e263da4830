//! API route handlers - maps HTTP endpoints to the git service, commands
//! and history tree.
//!
//! Each submodule defines routes for a feature area:
//! - `repository`: Work tree info (GET /api/v1/repository)
//! - `blame`: Blame for one line of a revision uri
//! - `commits`: Repository and file history, stashes
//! - `explorer`: Branch → commit → file tree items
//! - `commands`: Comparison commands
//! - `events`: Editor notifications (file saved)

pub mod blame;
pub mod commands;
pub mod commits;
pub mod events;
pub mod explorer;
pub mod repository;

use std::sync::Arc;

use axum::Router;

use crate::config::ExplorerConfig;
use crate::git::{GitDiffRenderer, GitService};

/// Shared by every handler. `repo_path` is the work tree the server was
/// started for.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GitService>,
    pub renderer: Arc<GitDiffRenderer>,
    pub repo_path: Arc<str>,
    pub explorer: Arc<ExplorerConfig>,
}

impl AppState {
    pub fn new(service: Arc<GitService>, repo_path: &str, explorer: ExplorerConfig) -> Self {
        Self {
            renderer: Arc::new(GitDiffRenderer::new(service.clone())),
            service,
            repo_path: Arc::from(repo_path),
            explorer: Arc::new(explorer),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repository::routes(state.clone()))
        .merge(blame::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(explorer::routes(state.clone()))
        .merge(commands::routes(state.clone()))
        .merge(events::routes(state))
}
