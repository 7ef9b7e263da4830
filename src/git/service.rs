//! Async git data service.
//!
//! `GitDataSource` is the seam the resolver, explorer and commands depend on.
//! `GitService` implements it over libgit2: every query runs on the blocking
//! pool against a repository handle opened once per work tree, and blame/log
//! results go through a short-lived `ReadCache`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::commands::diff_with::ComparisonRequest;
use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::error::{AppError, Result};
use crate::git::cache::{BlameKey, CacheStats, LogDetail, LogKey, ReadCache};
use crate::git::repository::{GitRepository, head_id};
use crate::git::uri::RevisionUri;
use crate::git::{blame, diff, history};
use crate::models::{BlameLine, Branch, Commit, LogResult, RenderedDiff, RepositoryInfo};

#[async_trait]
pub trait GitDataSource: Send + Sync {
    /// Work tree root containing `path`, if any.
    async fn repo_path_for_file(&self, path: &Path) -> Result<Option<String>>;

    /// Blame for one zero-based line in blame coordinates. `None` when the
    /// file is not tracked or the line does not exist.
    async fn blame_for_line(&self, uri: &RevisionUri, line: u32) -> Result<Option<BlameLine>>;

    /// History reachable from `reference`. `None` when the reference does not
    /// resolve or the repository cannot be opened. File statuses are only
    /// loaded with `LogDetail::Files`.
    async fn log_for_repo(
        &self,
        repo_path: &str,
        reference: &str,
        max_count: Option<usize>,
        detail: LogDetail,
    ) -> Result<Option<LogResult>>;

    async fn branches(&self, repo_path: &str) -> Result<Vec<Branch>>;
}

pub struct GitService {
    repos: Mutex<HashMap<String, Arc<GitRepository>>>,
    blame_cache: Arc<ReadCache<BlameKey, Option<BlameLine>>>,
    log_cache: Arc<ReadCache<LogKey, Option<LogResult>>>,
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("git task failed: {e}")))?
}

impl GitService {
    pub fn new(cache_ttl: Duration) -> Self {
        Self::with_capacity(cache_ttl, DEFAULT_CACHE_CAPACITY)
    }

    /// `capacity` bounds each of the blame and log caches.
    pub fn with_capacity(cache_ttl: Duration, capacity: usize) -> Self {
        Self {
            repos: Mutex::new(HashMap::new()),
            blame_cache: Arc::new(ReadCache::with_capacity(cache_ttl, capacity)),
            log_cache: Arc::new(ReadCache::with_capacity(cache_ttl, capacity)),
        }
    }

    /// Handle for the work tree at `repo_path`, opened on first use.
    pub fn repository(&self, repo_path: &str) -> Result<Arc<GitRepository>> {
        let mut repos = self
            .repos
            .lock()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        if let Some(repo) = repos.get(repo_path) {
            return Ok(repo.clone());
        }

        let repo = Arc::new(GitRepository::open(repo_path)?);
        tracing::info!(path = %repo.path, "opened repository");
        repos.insert(repo_path.to_string(), repo.clone());
        if repo.path != repo_path {
            repos.insert(repo.path.clone(), repo.clone());
        }
        Ok(repo)
    }

    fn repository_if_exists(&self, repo_path: &str) -> Result<Option<Arc<GitRepository>>> {
        match self.repository(repo_path) {
            Ok(repo) => Ok(Some(repo)),
            Err(AppError::RepoNotFound(path)) => {
                tracing::debug!(%path, "no repository");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn info(&self, repo_path: &str) -> Result<RepositoryInfo> {
        let repo = self.repository(repo_path)?;
        run_blocking(move || repo.info()).await
    }

    /// History of one file, newest first.
    pub async fn log_for_file(
        &self,
        repo_path: &str,
        file_path: &str,
        reference: &str,
        max_count: Option<usize>,
    ) -> Result<Option<LogResult>> {
        let Some(repo) = self.repository_if_exists(repo_path)? else {
            return Ok(None);
        };
        let file_path = file_path.to_string();
        let reference = reference.to_string();
        let params = format!("{file_path}, {reference}, {max_count:?}");
        let max_count = max_count.filter(|&n| n > 0);

        run_blocking(move || {
            repo.with_repo(|git| {
                history::log_for_file(git, &repo.path, &file_path, &reference, max_count)
            })
        })
        .await
        .map_err(AppError::invocation("getLogForFile", params))
    }

    pub async fn stash_list(&self, repo_path: &str) -> Result<Vec<Commit>> {
        let repo = self.repository(repo_path)?;
        run_blocking(move || repo.with_repo_mut(|git| history::stash_list(git, &repo.path)))
            .await
            .map_err(AppError::invocation("getStashList", repo_path))
    }

    pub async fn render_comparison(&self, request: ComparisonRequest) -> Result<RenderedDiff> {
        let repo = self.repository(&request.repo_path)?;
        let params = format!("{}..{}", request.lhs.sha, request.rhs.sha);
        run_blocking(move || repo.with_repo(|git| diff::render_comparison(git, &request)))
            .await
            .map_err(AppError::invocation("renderComparison", params))
    }

    /// A file was written; cached results may describe the old contents.
    pub fn notify_file_saved(&self, path: &Path) {
        tracing::debug!(path = %path.display(), "file saved");
        self.blame_cache.invalidate_all();
        self.log_cache.invalidate_all();
    }

    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.blame_cache.stats(), self.log_cache.stats())
    }
}

#[async_trait]
impl GitDataSource for GitService {
    async fn repo_path_for_file(&self, path: &Path) -> Result<Option<String>> {
        let dir = if path.is_dir() {
            path.to_path_buf()
        } else {
            path.parent().map(Path::to_path_buf).unwrap_or_default()
        };
        let Some(dir) = dir.to_str().filter(|d| !d.is_empty()) else {
            return Ok(None);
        };
        Ok(self.repository_if_exists(dir)?.map(|repo| repo.path.clone()))
    }

    async fn blame_for_line(&self, uri: &RevisionUri, line: u32) -> Result<Option<BlameLine>> {
        let Some(repo_path) = uri.repo_path.as_deref() else {
            return Ok(None);
        };
        let Some(repo) = self.repository_if_exists(repo_path)? else {
            return Ok(None);
        };

        let key = BlameKey {
            repo_path: repo.path.clone(),
            sha: uri.sha.clone(),
            file_path: uri.file_path.clone(),
            line,
        };
        let params = format!("{}@{}:{}", key.file_path, key.sha, line);
        tracing::debug!(%params, "getBlameForLine");

        let cache = self.blame_cache.clone();
        run_blocking(move || {
            repo.with_repo(|git| {
                let head = head_id(git);
                if let Some(hit) = cache.get(&key, head.as_deref()) {
                    return Ok(hit);
                }
                let sha = (!key.sha.is_empty()).then_some(key.sha.as_str());
                let result = blame::blame_line(git, &repo.path, &key.file_path, sha, key.line)?;
                cache.insert(key, head, result.clone());
                Ok(result)
            })
        })
        .await
        .map_err(AppError::invocation("getBlameForLine", params))
    }

    async fn log_for_repo(
        &self,
        repo_path: &str,
        reference: &str,
        max_count: Option<usize>,
        detail: LogDetail,
    ) -> Result<Option<LogResult>> {
        let Some(repo) = self.repository_if_exists(repo_path)? else {
            return Ok(None);
        };

        let key = LogKey {
            repo_path: repo.path.clone(),
            reference: reference.to_string(),
            max_count: max_count.filter(|&n| n > 0),
            detail,
        };
        let params = format!("{}, {:?}, {:?}", key.reference, key.max_count, key.detail);
        tracing::debug!(%params, "getLogForRepo");

        let cache = self.log_cache.clone();
        run_blocking(move || {
            repo.with_repo(|git| {
                let head = head_id(git);
                if let Some(hit) = cache.get(&key, head.as_deref()) {
                    return Ok(hit);
                }
                let result = history::log_for_repo(
                    git,
                    &repo.path,
                    &key.reference,
                    key.max_count,
                    key.detail,
                )?;
                cache.insert(key, head, result.clone());
                Ok(result)
            })
        })
        .await
        .map_err(AppError::invocation("getLogForRepo", params))
    }

    async fn branches(&self, repo_path: &str) -> Result<Vec<Branch>> {
        let repo = self.repository(repo_path)?;
        run_blocking(move || repo.with_repo(history::list_branches))
            .await
            .map_err(AppError::invocation("getBranches", repo_path))
    }
}
