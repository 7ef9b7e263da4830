use crate::config::ExplorerConfig;
use crate::error::Result;
use crate::git::LogDetail;
use crate::git::service::GitDataSource;
use crate::models::{Branch, Commit, CommitKind};

use super::formatter::{CommitFormatOptions, CommitFormatter};
use super::{
    CollapsibleState, CommitFileNode, ExplorerNode, NodeState, TreeItem, diff_with_previous_command,
};

#[derive(Debug)]
pub struct CommitNode {
    pub commit: Commit,
    pub branch: Option<Branch>,
    pub state: NodeState,
}

impl CommitNode {
    pub fn new(commit: Commit, branch: Option<Branch>) -> Self {
        Self {
            commit,
            branch,
            state: NodeState::Unexpanded,
        }
    }

    /// One child per file the commit touched. File-scoped commits are leaves.
    ///
    /// Branch listings are shallow, so the statuses are loaded here for this
    /// one commit.
    pub async fn get_children(&mut self, git: &dyn GitDataSource) -> Result<&[ExplorerNode]> {
        if matches!(self.commit.kind, CommitKind::File) {
            return Ok(self.state.replace(Vec::new()));
        }

        let log = git
            .log_for_repo(&self.commit.repo_path, &self.commit.sha, Some(1), LogDetail::Files)
            .await?;
        let Some(detailed) = log.and_then(|log| log.commits.into_values().next()) else {
            return Ok(self.state.replace(Vec::new()));
        };

        let children = detailed
            .file_statuses
            .iter()
            .cloned()
            .map(|status| {
                ExplorerNode::CommitFile(CommitFileNode::new(
                    status,
                    detailed.clone(),
                    self.branch.clone(),
                ))
            })
            .collect();
        Ok(self.state.replace(children))
    }

    pub fn get_tree_item(&self, config: &ExplorerConfig) -> TreeItem {
        let label = CommitFormatter::from_template(
            &config.commit_template,
            &self.commit,
            CommitFormatOptions {
                truncate_message_at_newline: true,
                date_format: &config.date_format,
            },
        );

        if matches!(self.commit.kind, CommitKind::File) {
            let icon = self
                .commit
                .status
                .map(|s| s.icon_name())
                .unwrap_or("commit")
                .to_string();
            return TreeItem {
                label,
                collapsible_state: CollapsibleState::None,
                context_value: "revlens:commit-file".to_string(),
                icon,
                tooltip: Some(self.commit.message.clone()),
                command: Some(diff_with_previous_command(self.commit.clone())),
            };
        }

        TreeItem {
            label,
            collapsible_state: CollapsibleState::Collapsed,
            context_value: "revlens:commit".to_string(),
            icon: "commit".to_string(),
            tooltip: Some(self.commit.message.clone()),
            command: None,
        }
    }
}
