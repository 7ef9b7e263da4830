//! Single-line blame on top of libgit2.
//!
//! Working-copy blames run the committed blame through `blame_buffer` with
//! the on-disk contents, so lines that only exist locally come back with a
//! zero commit id. Those are reported as the uncommitted sentinel commit whose
//! parent is HEAD.

use std::path::Path;

use chrono::Utc;
use git2::{BlameOptions, ErrorCode, Oid, Repository};

use crate::error::Result;
use crate::git::history::{resolve_commit, tree_contains};
use crate::git::repository::commit_to_model;
use crate::models::{BlameLine, Commit, CommitKind, UNCOMMITTED_AUTHOR, UNCOMMITTED_SHA};

/// Blames one zero-based `line` of `file_path`. `sha` of `None` blames the
/// working copy.
///
/// Returns `None` when the file is not tracked at that revision, does not
/// exist, or is shorter than `line`. A file that is only staged blames as
/// uncommitted with no previous revision.
pub fn blame_line(
    repo: &Repository,
    repo_path: &str,
    file_path: &str,
    sha: Option<&str>,
    line: u32,
) -> Result<Option<BlameLine>> {
    let path = Path::new(file_path);
    let mut opts = BlameOptions::new();

    if let Some(sha) = sha {
        let Some(oid) = resolve_commit(repo, sha)? else {
            return Ok(None);
        };
        opts.newest_commit(oid);
    }

    let committed = match repo.blame_file(path, Some(&mut opts)) {
        Ok(blame) => blame,
        Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => {
            return match sha {
                None => staged_line(repo, repo_path, file_path, line),
                Some(_) => Ok(None),
            };
        }
        Err(e) => return Err(e.into()),
    };

    let contents;
    let buffered;
    let blame = if sha.is_none() {
        let Some(workdir) = repo.workdir() else {
            return Ok(None);
        };
        contents = match std::fs::read(workdir.join(path)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        buffered = committed.blame_buffer(&contents)?;
        &buffered
    } else {
        &committed
    };

    // libgit2 lines are one-based
    let final_line = line as usize + 1;
    let Some(hunk) = blame.get_line(final_line) else {
        return Ok(None);
    };

    let within_hunk = final_line.saturating_sub(hunk.final_start_line());
    let original_line = (hunk.orig_start_line() + within_hunk).saturating_sub(1) as u32;

    let commit = if hunk.final_commit_id().is_zero() {
        uncommitted_commit(repo, repo_path, file_path)?
    } else {
        let blamed_path = hunk
            .path()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| file_path.to_string());
        committed_commit(repo, repo_path, file_path, &blamed_path, hunk.final_commit_id())?
    };

    Ok(Some(BlameLine {
        line,
        original_line,
        commit,
    }))
}

/// Blame for a file that is staged but has never been committed. Every line
/// is uncommitted and has no earlier revision.
fn staged_line(
    repo: &Repository,
    repo_path: &str,
    file_path: &str,
    line: u32,
) -> Result<Option<BlameLine>> {
    let Some(workdir) = repo.workdir() else {
        return Ok(None);
    };
    let mut index = repo.index()?;
    // Picks up staging done by other processes since the handle was opened.
    index.read(false)?;
    if index.get_path(Path::new(file_path), 0).is_none() {
        return Ok(None);
    }

    let contents = match std::fs::read(workdir.join(file_path)) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if contents.split_inclusive(|&b| b == b'\n').count() <= line as usize {
        return Ok(None);
    }

    Ok(Some(BlameLine {
        line,
        original_line: line,
        commit: uncommitted_commit(repo, repo_path, file_path)?,
    }))
}

/// The pending change on a working-copy line. Its parent is HEAD when HEAD
/// has the file; a file that was never committed has no parent.
fn uncommitted_commit(repo: &Repository, repo_path: &str, file_path: &str) -> Result<Commit> {
    let mut commit = Commit::new(
        CommitKind::File,
        repo_path,
        UNCOMMITTED_SHA,
        file_path,
        UNCOMMITTED_AUTHOR,
        Utc::now(),
        "Uncommitted changes",
    );

    let head = match repo.head().and_then(|h| h.peel_to_commit()) {
        Ok(head) => Some(head),
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    if let Some(head) = head {
        if tree_contains(&head.tree()?, file_path) {
            commit.previous_sha = Some(head.id().to_string());
            commit.previous_file_name = Some(file_path.to_string());
        }
    }

    Ok(commit)
}

fn committed_commit(
    repo: &Repository,
    repo_path: &str,
    file_path: &str,
    blamed_path: &str,
    oid: Oid,
) -> Result<Commit> {
    let git_commit = repo.find_commit(oid)?;
    let mut commit = commit_to_model(CommitKind::File, repo_path, file_path, &git_commit);
    if blamed_path != file_path {
        commit.original_file_name = Some(blamed_path.to_string());
    }

    // The parent only counts as previous when it still had the file.
    commit.previous_sha = None;
    if let Ok(parent) = git_commit.parent(0) {
        if tree_contains(&parent.tree()?, blamed_path) {
            commit.previous_sha = Some(parent.id().to_string());
            commit.previous_file_name = Some(blamed_path.to_string());
        }
    }

    Ok(commit)
}
