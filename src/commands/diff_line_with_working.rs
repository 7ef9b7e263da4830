use serde::{Deserialize, Serialize};

use super::diff_with::{DiffRenderer, DisplayOptions, build_comparison, dispatch};
use super::{EditorContext, command_uri};
use crate::error::{Abort, Outcome, Result};
use crate::git::resolver::BlameResolver;
use crate::git::service::GitDataSource;
use crate::git::uri::RevisionUri;
use crate::models::Commit;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLineWithWorkingArgs {
    /// Commit to compare with; looked up by blame when absent or uncommitted
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub show_options: Option<DisplayOptions>,
}

/// Compares the revision that last changed a line with the working copy.
pub async fn execute<R>(
    git: &dyn GitDataSource,
    renderer: &R,
    editor: Option<&EditorContext>,
    uri: Option<&str>,
    args: DiffLineWithWorkingArgs,
) -> Result<Outcome<R::Output>>
where
    R: DiffRenderer + ?Sized,
{
    let Some(uri) = command_uri(uri, editor) else {
        return Ok(Outcome::Aborted(Abort::NoCommandTarget));
    };
    let revision = RevisionUri::from_uri(uri, git).await?;

    let line = args
        .line
        .unwrap_or_else(|| editor.map_or(revision.offset, EditorContext::cursor_line));

    let (commit, line) = match args.commit {
        Some(commit) if !commit.is_uncommitted() => (commit, line),
        _ => {
            let is_dirty = editor.is_some_and(|e| e.is_dirty);
            match BlameResolver::new(git).resolve(&revision, line, is_dirty).await? {
                Outcome::Done(target) => (target.commit, target.line),
                Outcome::Aborted(reason) => return Ok(Outcome::Aborted(reason)),
            }
        }
    };

    let request = build_comparison(&commit, "", line, args.show_options);
    dispatch(renderer, request).await.map(Outcome::Done)
}
