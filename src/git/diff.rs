//! Line diff between the two endpoints of a `ComparisonRequest`.
//!
//! This is the diff renderer the HTTP host hands comparisons to. Each side is
//! read from the commit tree at its sha, or from disk when the sha is empty.
//! A side whose file does not exist renders as empty content.

use std::path::{Component, Path};
use std::sync::Arc;

use async_trait::async_trait;
use git2::{DiffOptions, Patch, Repository};

use crate::commands::diff_with::{ComparisonRequest, DiffRenderer, RevisionEndpoint};
use crate::error::{AppError, Result};
use crate::git::history::resolve_commit;
use crate::git::service::GitService;
use crate::git::uri::relative_to;
use crate::models::{DiffHunk, DiffLine, DiffStats, LineType, RenderedDiff};

pub fn render_comparison(repo: &Repository, request: &ComparisonRequest) -> Result<RenderedDiff> {
    let root = Path::new(&request.repo_path);
    let old_path = contained_path(&request.lhs.uri, root)?;
    let new_path = contained_path(&request.rhs.uri, root)?;

    let old_content = endpoint_content(repo, root, &request.lhs, &old_path)?;
    let new_content = endpoint_content(repo, root, &request.rhs, &new_path)?;

    let mut opts = DiffOptions::new();
    opts.context_lines(3);

    let patch = Patch::from_buffers(
        &old_content,
        Some(Path::new(&old_path)),
        &new_content,
        Some(Path::new(&new_path)),
        Some(&mut opts),
    )?;

    let is_binary = patch.delta().flags().is_binary();
    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut stats = DiffStats::default();

    if !is_binary {
        for hunk_idx in 0..patch.num_hunks() {
            let (hunk, _) = patch.hunk(hunk_idx)?;

            let mut lines: Vec<DiffLine> = Vec::new();

            for line_idx in 0..patch.num_lines_in_hunk(hunk_idx)? {
                let line = patch.line_in_hunk(hunk_idx, line_idx)?;

                let line_type = match line.origin() {
                    '+' => {
                        stats.insertions += 1;
                        LineType::Addition
                    }
                    '-' => {
                        stats.deletions += 1;
                        LineType::Deletion
                    }
                    ' ' => LineType::Context,
                    _ => LineType::Header,
                };

                lines.push(DiffLine {
                    line_type,
                    old_lineno: line.old_lineno(),
                    new_lineno: line.new_lineno(),
                    content: String::from_utf8_lossy(line.content()).to_string(),
                });
            }

            hunks.push(DiffHunk {
                old_start: hunk.old_start(),
                old_lines: hunk.old_lines(),
                new_start: hunk.new_start(),
                new_lines: hunk.new_lines(),
                header: String::from_utf8_lossy(hunk.header()).to_string(),
                lines,
            });
        }
    }

    Ok(RenderedDiff {
        repo_path: request.repo_path.clone(),
        lhs: request.lhs.sha.clone(),
        rhs: request.rhs.sha.clone(),
        old_path,
        new_path,
        line: request.line,
        hunks,
        stats,
        is_binary,
    })
}

/// `uri` relative to the work tree root. Paths that leave the work tree are
/// rejected.
pub fn contained_path(uri: &Path, root: &Path) -> Result<String> {
    let relative = relative_to(uri, root);
    let escapes = Path::new(&relative)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.is_empty() || escapes {
        return Err(AppError::InvalidUri(format!(
            "{} is outside {}",
            uri.display(),
            root.display()
        )));
    }
    Ok(relative)
}

fn endpoint_content(
    repo: &Repository,
    root: &Path,
    endpoint: &RevisionEndpoint,
    path: &str,
) -> Result<Vec<u8>> {
    if endpoint.sha.is_empty() {
        let full = root.join(path);
        if let Ok(real) = std::fs::canonicalize(&full) {
            if !real.starts_with(root) {
                return Err(AppError::InvalidUri(format!(
                    "{path} links outside {}",
                    root.display()
                )));
            }
        }
        return match std::fs::read(&full) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        };
    }

    let oid = resolve_commit(repo, &endpoint.sha)?
        .ok_or_else(|| AppError::CommitNotFound(endpoint.sha.clone()))?;
    let tree = repo.find_commit(oid)?.tree()?;
    let Ok(entry) = tree.get_path(Path::new(path)) else {
        return Ok(Vec::new());
    };

    let obj = entry.to_object(repo)?;
    let blob = obj
        .as_blob()
        .ok_or_else(|| AppError::PathNotFound(format!("{} is not a file", path)))?;
    Ok(blob.content().to_vec())
}

/// Renders comparisons through the shared `GitService`.
pub struct GitDiffRenderer {
    git: Arc<GitService>,
}

impl GitDiffRenderer {
    pub fn new(git: Arc<GitService>) -> Self {
        Self { git }
    }
}

#[async_trait]
impl DiffRenderer for GitDiffRenderer {
    type Output = RenderedDiff;

    async fn render(&self, request: ComparisonRequest) -> Result<RenderedDiff> {
        self.git.render_comparison(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_inside_the_work_tree_are_relative() {
        let root = Path::new("/repo");
        assert_eq!(contained_path(Path::new("/repo/src/lib.rs"), root).unwrap(), "src/lib.rs");
    }

    #[test]
    fn paths_leaving_the_work_tree_are_rejected() {
        let root = Path::new("/repo");
        for uri in ["/etc/passwd", "/repo/../etc/passwd", "/repo"] {
            match contained_path(Path::new(uri), root) {
                Err(AppError::InvalidUri(_)) => {}
                other => panic!("{uri}: unexpected {other:?}"),
            }
        }
    }
}
