use git2::{BranchType, DiffFindOptions, DiffOptions, ErrorCode, Oid, Repository, Sort};
use std::path::Path;

use crate::error::Result;
use crate::git::cache::LogDetail;
use crate::git::repository::commit_to_model;
use crate::models::{
    Branch, Commit, CommitKind, FileStatus, FileStatusCode, LogResult, UNCOMMITTED_AUTHOR,
};

/// Resolves a branch, tag or sha to a commit id. `None` when the reference
/// does not name a commit.
pub fn resolve_commit(repo: &Repository, reference: &str) -> Result<Option<Oid>> {
    match repo.revparse_single(reference).and_then(|obj| obj.peel_to_commit()) {
        Ok(commit) => Ok(Some(commit.id())),
        Err(e)
            if matches!(
                e.code(),
                ErrorCode::NotFound
                    | ErrorCode::InvalidSpec
                    | ErrorCode::Ambiguous
                    | ErrorCode::Peel
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn tree_contains(tree: &git2::Tree, path: &str) -> bool {
    tree.get_path(Path::new(path)).is_ok()
}

/// Walks history from `reference`, newest first. With `LogDetail::Files`
/// each commit also carries its file changes against its first parent.
///
/// Reads one commit past `max_count` so `truncated` is only set when more
/// history actually exists.
pub fn log_for_repo(
    repo: &Repository,
    repo_path: &str,
    reference: &str,
    max_count: Option<usize>,
    detail: LogDetail,
) -> Result<Option<LogResult>> {
    let Some(start) = resolve_commit(repo, reference)? else {
        return Ok(None);
    };

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(start)?;

    let mut log = LogResult::default();
    for oid in revwalk {
        let oid = oid?;
        if max_count.is_some_and(|max| log.commits.len() >= max) {
            log.truncated = true;
            break;
        }

        let git_commit = repo.find_commit(oid)?;
        let mut commit = commit_to_model(CommitKind::Log, repo_path, "", &git_commit);
        if detail == LogDetail::Files {
            commit.file_statuses = commit_file_statuses(repo, &git_commit)?;
        }
        log.commits.insert(commit.sha.clone(), commit);
    }

    Ok(Some(log))
}

/// History of a single file. Every commit is a `file` commit carrying the
/// one status that commit applied to the path.
///
/// Renames are followed: once a commit is found to have renamed the file,
/// older commits are matched against the name it had before.
pub fn log_for_file(
    repo: &Repository,
    repo_path: &str,
    file_path: &str,
    reference: &str,
    max_count: Option<usize>,
) -> Result<Option<LogResult>> {
    let Some(start) = resolve_commit(repo, reference)? else {
        return Ok(None);
    };

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(start)?;

    let mut current = file_path.to_string();
    let mut log = LogResult::default();
    for oid in revwalk {
        let oid = oid?;
        let git_commit = repo.find_commit(oid)?;

        let Some(mut status) = path_status(repo, &git_commit, &current)? else {
            continue;
        };
        if status.status == FileStatusCode::Added {
            if let Some(renamed) = rename_into(repo, &git_commit, &current)? {
                status = renamed;
            }
        }
        if max_count.is_some_and(|max| log.commits.len() >= max) {
            log.truncated = true;
            break;
        }

        let mut commit = commit_to_model(CommitKind::File, repo_path, &current, &git_commit);
        commit.status = Some(status.status);
        if commit.status == Some(FileStatusCode::Added) {
            commit.previous_sha = None;
        } else {
            let previous = status.original_file_name.clone().unwrap_or_else(|| current.clone());
            commit.previous_file_name = Some(previous);
        }
        if let Some(original) = &status.original_file_name {
            tracing::debug!(from = %original, to = %current, sha = %commit.sha, "following rename");
            current = original.clone();
        }
        commit.file_statuses = vec![status];
        log.commits.insert(commit.sha.clone(), commit);
    }

    Ok(Some(log))
}

/// The rename in `commit` that produced `path`, if its addition was one.
fn rename_into(repo: &Repository, commit: &git2::Commit, path: &str) -> Result<Option<FileStatus>> {
    if commit.parent_count() == 0 {
        return Ok(None);
    }
    Ok(commit_file_statuses(repo, commit)?
        .into_iter()
        .find(|s| s.status == FileStatusCode::Renamed && s.file_name == path))
}

fn parent_tree<'r>(commit: &git2::Commit<'r>) -> Result<Option<git2::Tree<'r>>> {
    if commit.parent_count() > 0 {
        Ok(Some(commit.parent(0)?.tree()?))
    } else {
        Ok(None)
    }
}

/// Files changed by `commit` relative to its first parent, with renames detected.
pub fn commit_file_statuses(repo: &Repository, commit: &git2::Commit) -> Result<Vec<FileStatus>> {
    let tree = commit.tree()?;
    let parent = parent_tree(commit)?;

    let mut diff = repo.diff_tree_to_tree(parent.as_ref(), Some(&tree), None)?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

    Ok(diff.deltas().map(delta_to_status).collect())
}

fn path_status(repo: &Repository, commit: &git2::Commit, path: &str) -> Result<Option<FileStatus>> {
    let tree = commit.tree()?;
    let parent = parent_tree(commit)?;

    let mut opts = DiffOptions::new();
    opts.pathspec(path);
    opts.disable_pathspec_match(true);

    let diff = repo.diff_tree_to_tree(parent.as_ref(), Some(&tree), Some(&mut opts))?;
    Ok(diff.deltas().next().map(delta_to_status))
}

fn delta_to_status(delta: git2::DiffDelta) -> FileStatus {
    let status = FileStatusCode::from_delta(delta.status());
    let new_path = delta.new_file().path().map(|p| p.to_string_lossy().replace('\\', "/"));
    let old_path = delta.old_file().path().map(|p| p.to_string_lossy().replace('\\', "/"));

    let file_name = new_path.clone().or_else(|| old_path.clone()).unwrap_or_default();
    let original_file_name = match status {
        FileStatusCode::Renamed | FileStatusCode::Copied => {
            old_path.filter(|old| *old != file_name)
        }
        _ => None,
    };

    FileStatus {
        status,
        file_name,
        original_file_name,
    }
}

/// Local branches first, then remotes, each group sorted by name.
pub fn list_branches(repo: &Repository) -> Result<Vec<Branch>> {
    let mut branches = Vec::new();

    for entry in repo.branches(None)? {
        let (branch, branch_type) = entry?;
        let Some(name) = branch.name()?.map(|n| n.to_string()) else {
            continue;
        };
        let remote = branch_type == BranchType::Remote;
        if remote && name.ends_with("/HEAD") {
            continue;
        }

        let tracking = if remote {
            None
        } else {
            branch
                .upstream()
                .ok()
                .and_then(|upstream| upstream.name().ok().flatten().map(|n| n.to_string()))
        };

        branches.push(Branch {
            name,
            remote,
            current: branch.is_head(),
            tracking,
        });
    }

    branches.sort_by(|a, b| a.remote.cmp(&b.remote).then_with(|| a.name.cmp(&b.name)));
    Ok(branches)
}

/// Stash entries, newest first.
pub fn stash_list(repo: &mut Repository, repo_path: &str) -> Result<Vec<Commit>> {
    let mut entries: Vec<(usize, String, Oid)> = Vec::new();
    repo.stash_foreach(|index, message, oid| {
        entries.push((index, message.to_string(), *oid));
        true
    })?;

    let mut stashes = Vec::with_capacity(entries.len());
    for (index, message, oid) in entries {
        let git_commit = repo.find_commit(oid)?;
        let kind = CommitKind::Stash {
            stash_name: format!("stash@{{{index}}}"),
        };
        let mut commit = commit_to_model(kind, repo_path, "", &git_commit);
        commit.author = UNCOMMITTED_AUTHOR.to_string();
        commit.message = message;
        commit.file_statuses = commit_file_statuses(repo, &git_commit)?;
        stashes.push(commit);
    }

    Ok(stashes)
}
