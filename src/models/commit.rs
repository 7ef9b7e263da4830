use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sha git reports for lines that exist only in the working copy.
pub const UNCOMMITTED_SHA: &str = "0000000000000000000000000000000000000000";

/// Author recorded on uncommitted lines and stash entries.
pub const UNCOMMITTED_AUTHOR: &str = "You";

pub fn is_uncommitted(sha: &str) -> bool {
    sha == UNCOMMITTED_SHA
}

/// Which query produced a commit. Stash entries carry their `stash@{n}` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommitKind {
    File,
    Stash {
        #[serde(rename = "stashName")]
        stash_name: String,
    },
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatusCode {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChanged,
    Unmodified,
}

impl FileStatusCode {
    pub fn from_delta(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added | git2::Delta::Untracked => FileStatusCode::Added,
            git2::Delta::Deleted => FileStatusCode::Deleted,
            git2::Delta::Modified => FileStatusCode::Modified,
            git2::Delta::Renamed => FileStatusCode::Renamed,
            git2::Delta::Copied => FileStatusCode::Copied,
            git2::Delta::Typechange => FileStatusCode::TypeChanged,
            _ => FileStatusCode::Unmodified,
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            FileStatusCode::Added => "status-added",
            FileStatusCode::Deleted => "status-deleted",
            FileStatusCode::Modified => "status-modified",
            FileStatusCode::Renamed => "status-renamed",
            FileStatusCode::Copied => "status-copied",
            FileStatusCode::TypeChanged => "status-typechanged",
            FileStatusCode::Unmodified => "status-unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub status: FileStatusCode,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    #[serde(flatten)]
    pub kind: CommitKind,
    pub repo_path: String,
    pub sha: String,
    pub file_name: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatusCode>,
    #[serde(default)]
    pub file_statuses: Vec<FileStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_file_name: Option<String>,
}

impl Commit {
    pub fn new(
        kind: CommitKind,
        repo_path: impl Into<String>,
        sha: impl Into<String>,
        file_name: impl Into<String>,
        author: impl Into<String>,
        date: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            repo_path: repo_path.into(),
            sha: sha.into(),
            file_name: file_name.into(),
            author: author.into(),
            date,
            message: message.into(),
            status: None,
            file_statuses: Vec::new(),
            original_file_name: None,
            previous_sha: None,
            previous_file_name: None,
        }
    }

    pub fn is_uncommitted(&self) -> bool {
        is_uncommitted(&self.sha)
    }

    /// Identifier shown to the user: the stash name for stashes, otherwise
    /// the first seven characters of the sha.
    pub fn short_sha(&self) -> &str {
        match &self.kind {
            CommitKind::Stash { stash_name } => stash_name,
            CommitKind::File | CommitKind::Log => &self.sha[..7.min(self.sha.len())],
        }
    }

    /// Absolute path of the file this commit was queried for.
    pub fn uri(&self) -> PathBuf {
        Path::new(&self.repo_path).join(&self.file_name)
    }

    pub fn previous_uri(&self) -> Option<PathBuf> {
        let name = self
            .previous_file_name
            .as_deref()
            .or(self.original_file_name.as_deref())
            .unwrap_or(&self.file_name);
        self.previous_sha.as_ref()?;
        Some(Path::new(&self.repo_path).join(name))
    }

    /// The committed parent of this change, as a fresh commit value. `None`
    /// when the file has no earlier version (newly added).
    pub fn previous(&self) -> Option<Commit> {
        let sha = self.previous_sha.as_ref()?;
        let file_name = self.previous_file_name.as_ref()?;
        Some(Commit::new(
            self.kind.clone(),
            self.repo_path.clone(),
            sha.clone(),
            file_name.clone(),
            self.author.clone(),
            self.date,
            self.message.clone(),
        ))
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Commits keyed by sha, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResult {
    pub commits: IndexMap<String, Commit>,
    pub truncated: bool,
}

impl LogResult {
    pub fn first(&self) -> Option<&Commit> {
        self.commits.values().next()
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(kind: CommitKind) -> Commit {
        Commit::new(
            kind,
            "/repo",
            "1945ab9c752534e733c38ba0109dc3b741f0a6eb",
            "src/lib.rs",
            "Test Author",
            Utc.with_ymd_and_hms(2026, 1, 17, 2, 33, 6).unwrap(),
            "feat: add thing\n\nDetails.",
        )
    }

    #[test]
    fn short_sha_uses_stash_name_for_stashes() {
        assert_eq!(sample(CommitKind::Log).short_sha(), "1945ab9");
        let stash = sample(CommitKind::Stash { stash_name: "stash@{2}".into() });
        assert_eq!(stash.short_sha(), "stash@{2}");
    }

    #[test]
    fn sentinel_sha_is_uncommitted() {
        let mut commit = sample(CommitKind::File);
        assert!(!commit.is_uncommitted());
        commit.sha = UNCOMMITTED_SHA.to_string();
        assert!(commit.is_uncommitted());
    }

    #[test]
    fn previous_requires_sha_and_file_name() {
        let mut commit = sample(CommitKind::File);
        assert!(commit.previous().is_none());

        commit.previous_sha = Some("def456".into());
        assert!(commit.previous().is_none());

        commit.previous_file_name = Some("src/old.rs".into());
        let previous = commit.previous().unwrap();
        assert_eq!(previous.sha, "def456");
        assert_eq!(previous.file_name, "src/old.rs");
        assert_eq!(previous.uri(), PathBuf::from("/repo/src/old.rs"));
        assert!(previous.previous_sha.is_none());
    }

    #[test]
    fn kind_is_flattened_as_type_tag() {
        let stash = sample(CommitKind::Stash { stash_name: "stash@{0}".into() });
        let json = serde_json::to_value(&stash).unwrap();
        assert_eq!(json["type"], "stash");
        assert_eq!(json["stashName"], "stash@{0}");
        assert_eq!(json["repoPath"], "/repo");

        let back: Commit = serde_json::from_value(json).unwrap();
        assert_eq!(back, stash);
    }

    #[test]
    fn subject_stops_at_newline() {
        assert_eq!(sample(CommitKind::Log).subject(), "feat: add thing");
    }
}
