//! Comparison command endpoints.
//!
//! - POST /api/v1/commands/diff-line-with-working
//!   { editor?: EditorContext, uri?: string, args?: { commit?, line?, showOptions? } }
//! - POST /api/v1/commands/diff-with-previous
//!   { commit, line?, showOptions? }
//!
//! Both answer 200 with a CommandResponse: the rendered diff, a silent abort
//! reason, or a notice for the user. A commit from another repository is a 400.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::commands::{
    CommandId, CommandResponse, DiffLineWithWorkingArgs, DiffWithPreviousArgs, EditorContext,
    diff_line_with_working, diff_with_previous, report,
};
use crate::error::{AppError, Result};
use crate::models::{Commit, RenderedDiff};

use super::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/commands/diff-line-with-working", post(diff_line_with_working_handler))
        .route("/api/v1/commands/diff-with-previous", post(diff_with_previous_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffLineWithWorkingRequest {
    #[serde(default)]
    editor: Option<EditorContext>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    args: DiffLineWithWorkingArgs,
}

/// Commits sent by the client must belong to the served work tree.
fn ensure_served_repo(state: &AppState, commit: &Commit) -> Result<()> {
    if commit.repo_path != *state.repo_path {
        tracing::warn!(repo_path = %commit.repo_path, "rejected commit from another repository");
        return Err(AppError::InvalidUri(format!(
            "{} is not the served repository",
            commit.repo_path
        )));
    }
    Ok(())
}

async fn diff_line_with_working_handler(
    State(state): State<AppState>,
    Json(request): Json<DiffLineWithWorkingRequest>,
) -> Result<Json<CommandResponse<RenderedDiff>>> {
    if let Some(commit) = &request.args.commit {
        ensure_served_repo(&state, commit)?;
    }
    let result = diff_line_with_working::execute(
        state.service.as_ref(),
        state.renderer.as_ref(),
        request.editor.as_ref(),
        request.uri.as_deref(),
        request.args,
    )
    .await;
    Ok(Json(report(CommandId::DiffLineWithWorking, result)))
}

async fn diff_with_previous_handler(
    State(state): State<AppState>,
    Json(args): Json<DiffWithPreviousArgs>,
) -> Result<Json<CommandResponse<RenderedDiff>>> {
    ensure_served_repo(&state, &args.commit)?;
    let result = diff_with_previous::execute(state.renderer.as_ref(), args).await;
    Ok(Json(report(CommandId::DiffWithPrevious, result)))
}
