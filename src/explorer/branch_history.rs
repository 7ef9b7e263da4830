use crate::config::ExplorerConfig;
use crate::error::Result;
use crate::git::LogDetail;
use crate::git::service::GitDataSource;
use crate::models::Branch;

use super::{CollapsibleState, CommitNode, ExplorerNode, NodeState, ShowAllCommitsNode, TreeItem};

const RESOURCE_TYPE: &str = "revlens:branch-history";

/// Commit history of one branch, newest first.
#[derive(Debug)]
pub struct BranchHistoryNode {
    pub branch: Branch,
    pub repo_path: String,
    /// `None` lists the whole history
    pub max_count: Option<usize>,
    pub state: NodeState,
}

impl BranchHistoryNode {
    pub fn new(branch: Branch, repo_path: impl Into<String>, config: &ExplorerConfig) -> Self {
        Self {
            branch,
            repo_path: repo_path.into(),
            max_count: config.max_commits,
            state: NodeState::Unexpanded,
        }
    }

    pub async fn get_children(&mut self, git: &dyn GitDataSource) -> Result<&[ExplorerNode]> {
        let log = git
            .log_for_repo(&self.repo_path, &self.branch.name, self.max_count, LogDetail::Shallow)
            .await?;
        let Some(log) = log else {
            return Ok(self.state.replace(Vec::new()));
        };

        let truncated = log.truncated;
        let mut children: Vec<ExplorerNode> = log
            .commits
            .into_values()
            .map(|commit| ExplorerNode::Commit(CommitNode::new(commit, Some(self.branch.clone()))))
            .collect();

        if truncated {
            children.push(ExplorerNode::ShowAllCommits(ShowAllCommitsNode {
                branch: self.branch.name.clone(),
            }));
        }

        tracing::debug!(
            branch = %self.branch.name,
            commits = children.len(),
            truncated,
            "expanded branch"
        );
        Ok(self.state.replace(children))
    }

    /// Drops the depth limit; the next expansion lists the whole history.
    pub fn show_all(&mut self) {
        self.max_count = None;
        self.state = NodeState::Unexpanded;
    }

    pub fn get_tree_item(&self, config: &ExplorerConfig) -> TreeItem {
        let context_value = if self.branch.tracking.is_some() {
            format!("{RESOURCE_TYPE}:remote")
        } else {
            RESOURCE_TYPE.to_string()
        };

        TreeItem {
            label: branch_label(&self.branch, config),
            collapsible_state: CollapsibleState::Collapsed,
            context_value,
            icon: "branch".to_string(),
            tooltip: None,
            command: None,
        }
    }
}

/// `✓` marks the current branch; local branches can show their upstream.
pub fn branch_label(branch: &Branch, config: &ExplorerConfig) -> String {
    let mut name = branch.display_name().to_string();
    if !branch.remote && config.show_tracking_branch {
        if let Some(tracking) = &branch.tracking {
            name = format!("{name}  ⇄  {tracking}");
        }
    }

    if branch.current { format!("✓  {name}") } else { name }
}
