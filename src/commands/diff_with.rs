//! Comparison requests and their hand-off to a diff renderer.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Commit;

/// How the renderer should present the comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default)]
    pub preserve_focus: bool,
    #[serde(default)]
    pub preview: bool,
}

/// One side of a comparison. An empty sha means the working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionEndpoint {
    pub sha: String,
    pub uri: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub repo_path: String,
    pub lhs: RevisionEndpoint,
    pub rhs: RevisionEndpoint,
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

/// Compares `lhs_commit`'s file against the same file at `rhs_sha`.
pub fn build_comparison(
    lhs_commit: &Commit,
    rhs_sha: &str,
    line: u32,
    display_options: Option<DisplayOptions>,
) -> ComparisonRequest {
    let uri = lhs_commit.uri();
    ComparisonRequest {
        repo_path: lhs_commit.repo_path.clone(),
        lhs: RevisionEndpoint {
            sha: lhs_commit.sha.clone(),
            uri: uri.clone(),
        },
        rhs: RevisionEndpoint {
            sha: rhs_sha.to_string(),
            uri,
        },
        line,
        display_options,
    }
}

/// Opens comparisons. Implemented by whatever presents diffs to the user.
#[async_trait]
pub trait DiffRenderer: Send + Sync {
    type Output: Send;

    async fn render(&self, request: ComparisonRequest) -> Result<Self::Output>;
}

/// Hands `request` to `renderer` and returns its result untouched.
pub async fn dispatch<R>(renderer: &R, request: ComparisonRequest) -> Result<R::Output>
where
    R: DiffRenderer + ?Sized,
{
    tracing::debug!(
        lhs = %request.lhs.sha,
        rhs = %request.rhs.sha,
        line = request.line,
        "dispatching comparison"
    );
    renderer.render(request).await
}
