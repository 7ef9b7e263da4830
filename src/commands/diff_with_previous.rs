use serde::{Deserialize, Serialize};

use super::diff_with::{ComparisonRequest, DiffRenderer, DisplayOptions, RevisionEndpoint, dispatch};
use crate::error::{Abort, Outcome, Result};
use crate::models::Commit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffWithPreviousArgs {
    pub commit: Commit,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub show_options: Option<DisplayOptions>,
}

/// Parent on the left, the commit itself on the right. An uncommitted
/// commit is compared as the working copy.
pub fn previous_comparison(args: &DiffWithPreviousArgs) -> Option<ComparisonRequest> {
    let commit = &args.commit;
    let lhs_sha = commit.previous_sha.clone()?;
    let lhs_uri = commit.previous_uri()?;
    let rhs_sha = if commit.is_uncommitted() {
        String::new()
    } else {
        commit.sha.clone()
    };

    Some(ComparisonRequest {
        repo_path: commit.repo_path.clone(),
        lhs: RevisionEndpoint {
            sha: lhs_sha,
            uri: lhs_uri,
        },
        rhs: RevisionEndpoint {
            sha: rhs_sha,
            uri: commit.uri(),
        },
        line: args.line.unwrap_or(0),
        display_options: args.show_options,
    })
}

/// Compares a file commit with the revision before it.
pub async fn execute<R>(renderer: &R, args: DiffWithPreviousArgs) -> Result<Outcome<R::Output>>
where
    R: DiffRenderer + ?Sized,
{
    let Some(request) = previous_comparison(&args) else {
        return Ok(Outcome::Aborted(Abort::NoPriorHistory));
    };
    dispatch(renderer, request).await.map(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::diff_with::tests::RecordingRenderer;
    use crate::git::resolver::tests::commit;
    use std::path::PathBuf;

    #[tokio::test]
    async fn compares_parent_with_commit() {
        let mut file_commit = commit("abc123");
        file_commit.previous_sha = Some("def456".into());
        file_commit.previous_file_name = Some("old.ts".into());
        let renderer = RecordingRenderer::default();

        let args = DiffWithPreviousArgs {
            commit: file_commit,
            line: None,
            show_options: None,
        };
        let request = execute(&renderer, args).await.unwrap().done().unwrap();

        assert_eq!(request.lhs.sha, "def456");
        assert_eq!(request.lhs.uri, PathBuf::from("/repo/old.ts"));
        assert_eq!(request.rhs.sha, "abc123");
        assert_eq!(request.rhs.uri, PathBuf::from("/repo/file.ts"));
        assert_eq!(request.line, 0);
    }

    #[tokio::test]
    async fn added_file_has_nothing_to_compare() {
        let renderer = RecordingRenderer::default();
        let args = DiffWithPreviousArgs {
            commit: commit("abc123"),
            line: Some(3),
            show_options: None,
        };

        let outcome = execute(&renderer, args).await.unwrap();
        assert_eq!(outcome, Outcome::Aborted(Abort::NoPriorHistory));
        assert!(renderer.requests.lock().unwrap().is_empty());
    }
}
