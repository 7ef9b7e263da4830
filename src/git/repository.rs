use chrono::{DateTime, Utc};
use git2::Repository;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{Commit, CommitKind, RepositoryInfo};

pub struct GitRepository {
    pub repo: Mutex<Repository>,
    /// Root of the work tree, without a trailing separator
    pub path: String,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::discover(&path)
            .map_err(|_| AppError::RepoNotFound(path_str.clone()))?;
        let root = work_tree_root(&repo).ok_or_else(|| AppError::RepoNotFound(path_str))?;

        Ok(Self {
            repo: Mutex::new(repo),
            path: root,
        })
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        self.with_repo(|repo| {
            let name = Path::new(&self.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());

            let head_branch = repo.head().ok().and_then(|h| {
                if h.is_branch() {
                    h.shorthand().map(|s| s.to_string())
                } else {
                    None
                }
            });

            Ok(RepositoryInfo {
                name,
                path: self.path.clone(),
                head_branch,
                head_sha: head_id(repo),
            })
        })
    }

    pub fn with_repo<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = self.repo.lock().map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        f(&repo)
    }

    pub fn with_repo_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Repository) -> Result<T>,
    {
        let mut repo = self
            .repo
            .lock()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        f(&mut repo)
    }
}

/// Work tree root of a non-bare repository, canonicalized when possible.
pub fn work_tree_root(repo: &Repository) -> Option<String> {
    let workdir = repo.workdir()?;
    let root: PathBuf = std::fs::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf());
    let root = root.to_string_lossy().to_string();
    Some(root.trim_end_matches(['/', '\\']).to_string())
}

pub fn head_id(repo: &Repository) -> Option<String> {
    repo.head()
        .and_then(|h| h.peel_to_commit())
        .map(|c| c.id().to_string())
        .ok()
}

/// Builds a fresh `Commit` value from a libgit2 commit.
pub fn commit_to_model(
    kind: CommitKind,
    repo_path: &str,
    file_name: &str,
    commit: &git2::Commit,
) -> Commit {
    let date = DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_else(Utc::now);
    let mut model = Commit::new(
        kind,
        repo_path,
        commit.id().to_string(),
        file_name,
        commit.author().name().unwrap_or("Unknown"),
        date,
        commit.message().unwrap_or("").trim(),
    );
    model.previous_sha = commit.parent_ids().next().map(|id| id.to_string());
    model
}

/// "3 days ago" style age of a unix timestamp, used by `${ago}` labels.
pub fn format_relative_time(timestamp: i64) -> String {
    const UNITS: [(i64, &str); 5] = [
        (31_536_000, "year"),
        (2_592_000, "month"),
        (86_400, "day"),
        (3_600, "hour"),
        (60, "minute"),
    ];

    let age = chrono::Utc::now().timestamp() - timestamp;
    UNITS
        .iter()
        .find(|(secs, _)| age >= *secs)
        .map(|&(secs, unit)| {
            let n = age / secs;
            format!("{n} {unit}{} ago", if n == 1 { "" } else { "s" })
        })
        .unwrap_or_else(|| "just now".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_time_buckets() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(format_relative_time(now), "just now");
        assert_eq!(format_relative_time(now - 60), "1 minute ago");
        assert_eq!(format_relative_time(now - 2 * 3600), "2 hours ago");
        assert_eq!(format_relative_time(now - 3 * 86400), "3 days ago");
    }

    #[test]
    fn open_outside_repository_is_repo_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match GitRepository::open(dir.path()) {
            Err(AppError::RepoNotFound(_)) => {}
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("temp dir should not be a repository"),
        }
    }
}
