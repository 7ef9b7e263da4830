use std::path::Path;

use crate::models::{Branch, Commit, CommitKind, FileStatus, FileStatusCode};

use super::{CollapsibleState, TreeItem, diff_with_previous_command};

/// One file changed by a commit.
#[derive(Debug)]
pub struct CommitFileNode {
    pub status: FileStatus,
    pub commit: Commit,
    pub branch: Option<Branch>,
}

impl CommitFileNode {
    pub fn new(status: FileStatus, commit: Commit, branch: Option<Branch>) -> Self {
        Self { status, commit, branch }
    }

    /// The commit narrowed to this file, ready for a previous-revision diff.
    pub fn file_commit(&self) -> Commit {
        let mut commit = Commit::new(
            CommitKind::File,
            self.commit.repo_path.clone(),
            self.commit.sha.clone(),
            self.status.file_name.clone(),
            self.commit.author.clone(),
            self.commit.date,
            self.commit.message.clone(),
        );
        commit.status = Some(self.status.status);
        commit.file_statuses = vec![self.status.clone()];
        commit.original_file_name = self.status.original_file_name.clone();
        if self.status.status != FileStatusCode::Added {
            commit.previous_sha = self.commit.previous_sha.clone();
            commit.previous_file_name = Some(
                self.status
                    .original_file_name
                    .clone()
                    .unwrap_or_else(|| self.status.file_name.clone()),
            );
        }
        commit
    }

    pub fn get_tree_item(&self) -> TreeItem {
        let path = Path::new(&self.status.file_name);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.status.file_name.clone());
        let label = match path.parent().map(|p| p.to_string_lossy()) {
            Some(dir) if !dir.is_empty() => format!("{name}  •  {dir}"),
            _ => name,
        };

        TreeItem {
            label,
            collapsible_state: CollapsibleState::None,
            context_value: "revlens:commit-file".to_string(),
            icon: self.status.status.icon_name().to_string(),
            tooltip: Some(self.status.file_name.clone()),
            command: Some(diff_with_previous_command(self.file_commit())),
        }
    }
}
