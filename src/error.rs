//! Application error types and HTTP response mapping.
//!
//! `AppError` covers every failure the core reports. Expected, silent
//! conditions (dirty buffer, missing parent commit, no command target) are
//! not errors; they travel as `Abort` values inside `Outcome`.
//!
//! Error mappings:
//! - `RepoNotFound`, `PathNotFound`, `CommitNotFound`, `NotUnderSourceControl` → 404
//! - `InvalidUri` → 400
//! - `Git`, `GitInvocation`, `Io`, `Internal` → 500

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Invalid revision uri: {0}")]
    InvalidUri(String),

    #[error("File is not under source control: {0}")]
    NotUnderSourceControl(String),

    #[error("{operation}({params}) failed: {source}")]
    GitInvocation {
        operation: &'static str,
        params: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps an error raised while running `operation` so the log line and the
    /// notice both carry the parameters that were queried.
    pub fn invocation(
        operation: &'static str,
        params: impl Into<String>,
    ) -> impl FnOnce(AppError) -> AppError {
        let params = params.into();
        move |source| match source {
            AppError::GitInvocation { .. } => source,
            other => AppError::GitInvocation {
                operation,
                params,
                source: Box::new(other),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RepoNotFound(_)
            | AppError::PathNotFound(_)
            | AppError::CommitNotFound(_)
            | AppError::NotUnderSourceControl(_) => StatusCode::NOT_FOUND,
            AppError::InvalidUri(_) => StatusCode::BAD_REQUEST,
            AppError::Git(_)
            | AppError::GitInvocation { .. }
            | AppError::Io(_)
            | AppError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Why a command stopped without doing anything. None of these are shown to
/// the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Abort {
    /// No document or uri to act on.
    NoCommandTarget,
    /// The editor buffer has unsaved changes.
    DirtyBuffer,
    /// The requested line sits above the start of the real file.
    LineBeforeStart,
    /// An uncommitted change has no committed parent to compare against.
    NoPriorHistory,
}

/// Result of a step that may stop early for an expected reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Aborted(Abort),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Aborted(reason) => Outcome::Aborted(reason),
        }
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Aborted(_) => None,
        }
    }
}
