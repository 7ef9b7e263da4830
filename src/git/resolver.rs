//! Line → authoring commit resolution.
//!
//! Takes a view line, strips the uri offset, blames it, and when the line is
//! an uncommitted change swaps in the committed parent so there is something
//! real to compare the working copy against.

use serde::Serialize;

use crate::error::{Abort, AppError, Outcome, Result};
use crate::git::service::GitDataSource;
use crate::git::uri::RevisionUri;
use crate::models::Commit;

/// Commit and view line a comparison should open at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameTarget {
    pub commit: Commit,
    pub line: u32,
}

pub struct BlameResolver<'a> {
    git: &'a dyn GitDataSource,
}

impl<'a> BlameResolver<'a> {
    pub fn new(git: &'a dyn GitDataSource) -> Self {
        Self { git }
    }

    /// Resolves `line` (view coordinates) of `uri`.
    ///
    /// Aborts without querying git when the buffer is dirty or the line is
    /// above the real file. A line with no blame is `NotUnderSourceControl`.
    pub async fn resolve(
        &self,
        uri: &RevisionUri,
        line: u32,
        is_dirty: bool,
    ) -> Result<Outcome<BlameTarget>> {
        if is_dirty {
            return Ok(Outcome::Aborted(Abort::DirtyBuffer));
        }

        let Some(blame_line) = uri.blame_line(line) else {
            return Ok(Outcome::Aborted(Abort::LineBeforeStart));
        };

        let blame = match self.git.blame_for_line(uri, blame_line).await {
            Ok(Some(blame)) => blame,
            Ok(None) => {
                let path = uri.absolute_path().display().to_string();
                return Err(AppError::NotUnderSourceControl(path));
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    line = blame_line,
                    file = %uri.file_path,
                    "getBlameForLine failed"
                );
                return Err(e);
            }
        };

        if !blame.commit.is_uncommitted() {
            return Ok(Outcome::Done(BlameTarget {
                commit: blame.commit,
                line,
            }));
        }

        // Uncommitted lines sit one below where the last commit had them.
        match blame.commit.previous() {
            Some(previous) => Ok(Outcome::Done(BlameTarget {
                commit: previous,
                line: uri.view_line(blame.line + 1),
            })),
            None => Ok(Outcome::Aborted(Abort::NoPriorHistory)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::git::LogDetail;
    use crate::models::{BlameLine, Branch, CommitKind, LogResult, UNCOMMITTED_SHA};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::path::Path;
    use std::sync::Mutex;

    /// Answers every blame with a fixed result and records queried lines.
    pub(crate) struct StubGit {
        pub blame: Option<BlameLine>,
        pub fail: bool,
        pub queried: Mutex<Vec<u32>>,
    }

    impl StubGit {
        pub fn returning(blame: Option<BlameLine>) -> Self {
            Self {
                blame,
                fail: false,
                queried: Mutex::new(Vec::new()),
            }
        }

        pub fn queried(&self) -> Vec<u32> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GitDataSource for StubGit {
        async fn repo_path_for_file(&self, _path: &Path) -> Result<Option<String>> {
            Ok(Some("/repo".into()))
        }

        async fn blame_for_line(&self, _uri: &RevisionUri, line: u32) -> Result<Option<BlameLine>> {
            self.queried.lock().unwrap().push(line);
            if self.fail {
                return Err(AppError::Internal("git exploded".into()));
            }
            Ok(self.blame.clone().map(|mut b| {
                b.line = line;
                b
            }))
        }

        async fn log_for_repo(
            &self,
            _: &str,
            _: &str,
            _: Option<usize>,
            _: LogDetail,
        ) -> Result<Option<LogResult>> {
            Ok(None)
        }

        async fn branches(&self, _: &str) -> Result<Vec<Branch>> {
            Ok(Vec::new())
        }
    }

    pub(crate) fn commit(sha: &str) -> Commit {
        Commit::new(
            CommitKind::File,
            "/repo",
            sha,
            "file.ts",
            "Author",
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            "message",
        )
    }

    pub(crate) fn uncommitted(previous_sha: Option<&str>) -> Commit {
        let mut commit = commit(UNCOMMITTED_SHA);
        commit.previous_sha = previous_sha.map(String::from);
        commit.previous_file_name = previous_sha.map(|_| "file.ts".to_string());
        commit
    }

    pub(crate) fn blamed(commit: Commit) -> Option<BlameLine> {
        Some(BlameLine {
            line: 0,
            original_line: 0,
            commit,
        })
    }

    fn uri(offset: u32) -> RevisionUri {
        RevisionUri::working("/repo", "file.ts").with_offset(offset)
    }

    #[tokio::test]
    async fn committed_line_keeps_commit_and_line() {
        let git = StubGit::returning(blamed(commit("abc123")));
        let outcome = BlameResolver::new(&git).resolve(&uri(0), 10, false).await.unwrap();

        let target = outcome.done().unwrap();
        assert_eq!(target.commit.sha, "abc123");
        assert_eq!(target.line, 10);
        assert_eq!(git.queried(), vec![10]);
    }

    #[tokio::test]
    async fn uncommitted_line_targets_previous_commit() {
        let git = StubGit::returning(blamed(uncommitted(Some("def456"))));
        let outcome = BlameResolver::new(&git).resolve(&uri(0), 9, false).await.unwrap();

        let target = outcome.done().unwrap();
        assert_eq!(target.commit.sha, "def456");
        assert_eq!(target.commit.file_name, "file.ts");
        assert_eq!(target.line, 10);
    }

    #[tokio::test]
    async fn uncommitted_line_without_parent_aborts() {
        let git = StubGit::returning(blamed(uncommitted(None)));
        let outcome = BlameResolver::new(&git).resolve(&uri(0), 3, false).await.unwrap();
        assert_eq!(outcome, Outcome::Aborted(Abort::NoPriorHistory));
    }

    #[tokio::test]
    async fn dirty_buffer_aborts_before_query() {
        let git = StubGit::returning(blamed(commit("abc123")));
        let outcome = BlameResolver::new(&git).resolve(&uri(0), 10, true).await.unwrap();
        assert_eq!(outcome, Outcome::Aborted(Abort::DirtyBuffer));
        assert!(git.queried().is_empty());
    }

    #[tokio::test]
    async fn missing_blame_is_not_under_source_control() {
        let git = StubGit::returning(None);
        let err = BlameResolver::new(&git).resolve(&uri(0), 1, false).await.unwrap_err();
        assert!(matches!(err, AppError::NotUnderSourceControl(_)));
    }

    #[tokio::test]
    async fn git_failure_propagates() {
        let mut git = StubGit::returning(None);
        git.fail = true;
        let err = BlameResolver::new(&git).resolve(&uri(0), 1, false).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    proptest! {
        #[test]
        fn offset_is_removed_before_blame(
            offset in 0u32..50,
            line in 0u32..100,
            pending in any::<bool>(),
        ) {
            let blame = if pending { uncommitted(Some("def456")) } else { commit("abc123") };
            let git = StubGit::returning(blamed(blame));
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let outcome = runtime
                .block_on(BlameResolver::new(&git).resolve(&uri(offset), line, false))
                .unwrap();

            if line < offset {
                prop_assert_eq!(outcome, Outcome::Aborted(Abort::LineBeforeStart));
                prop_assert!(git.queried().is_empty());
            } else {
                prop_assert_eq!(git.queried(), vec![line - offset]);
                let target = outcome.done().unwrap();
                if pending {
                    prop_assert_eq!(target.commit.sha.as_str(), "def456");
                    prop_assert_eq!(target.line, line - offset + 1 + offset);
                } else {
                    prop_assert_eq!(target.line, line);
                }
            }
        }
    }
}
