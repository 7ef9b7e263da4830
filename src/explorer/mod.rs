//! Lazy history tree: branch → commits → changed files.
//!
//! Each expandable node holds a `NodeState`. Expanding always re-fetches and
//! replaces the children; nothing is merged into an earlier expansion. The
//! host only sees `TreeItem`s and `NodeRef`s, never git handles.

pub mod branch_history;
pub mod commit;
pub mod commit_file;
pub mod formatter;

use serde::{Deserialize, Serialize};

use crate::commands::{CommandId, DiffWithPreviousArgs, DisplayOptions};
use crate::config::ExplorerConfig;
use crate::error::Result;
use crate::git::service::GitDataSource;
use crate::models::Commit;

pub use branch_history::BranchHistoryNode;
pub use commit::CommitNode;
pub use commit_file::CommitFileNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapsibleState {
    None,
    Collapsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TreeCommandArgs {
    DiffWithPrevious(DiffWithPreviousArgs),
    ShowAllCommits { branch: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeCommand {
    pub title: String,
    pub command: CommandId,
    pub arguments: TreeCommandArgs,
}

/// What the host renders for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItem {
    pub label: String,
    pub collapsible_state: CollapsibleState,
    pub context_value: String,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<TreeCommand>,
}

/// Identifies a node so the host can ask for its children later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeRef {
    Branch { name: String },
    Commit { sha: String },
    #[serde(rename_all = "camelCase")]
    CommitFile { sha: String, file_name: String },
    ShowAllCommits { branch: String },
}

#[derive(Debug, Serialize)]
pub struct NodeView {
    pub node: NodeRef,
    pub item: TreeItem,
}

#[derive(Debug, Default)]
pub enum NodeState {
    #[default]
    Unexpanded,
    Expanded(Vec<ExplorerNode>),
}

impl NodeState {
    pub fn is_expanded(&self) -> bool {
        matches!(self, NodeState::Expanded(_))
    }

    pub fn children(&self) -> &[ExplorerNode] {
        match self {
            NodeState::Unexpanded => &[],
            NodeState::Expanded(children) => children,
        }
    }

    fn replace(&mut self, children: Vec<ExplorerNode>) -> &[ExplorerNode] {
        *self = NodeState::Expanded(children);
        self.children()
    }
}

/// Marker appended to a truncated branch history.
#[derive(Debug, Clone)]
pub struct ShowAllCommitsNode {
    pub branch: String,
}

impl ShowAllCommitsNode {
    pub fn get_tree_item(&self) -> TreeItem {
        TreeItem {
            label: "Show All Commits".to_string(),
            collapsible_state: CollapsibleState::None,
            context_value: "revlens:show-more".to_string(),
            icon: "more".to_string(),
            tooltip: Some("Shows all commits (may take a while)".to_string()),
            command: Some(TreeCommand {
                title: "Show All Commits".to_string(),
                command: CommandId::ShowAllCommits,
                arguments: TreeCommandArgs::ShowAllCommits {
                    branch: self.branch.clone(),
                },
            }),
        }
    }
}

#[derive(Debug)]
pub enum ExplorerNode {
    BranchHistory(BranchHistoryNode),
    Commit(CommitNode),
    CommitFile(CommitFileNode),
    ShowAllCommits(ShowAllCommitsNode),
}

impl ExplorerNode {
    /// Expands the node, replacing any earlier children. Leaves have none.
    pub async fn get_children(&mut self, git: &dyn GitDataSource) -> Result<&[ExplorerNode]> {
        match self {
            ExplorerNode::BranchHistory(node) => node.get_children(git).await,
            ExplorerNode::Commit(node) => node.get_children(git).await,
            ExplorerNode::CommitFile(_) | ExplorerNode::ShowAllCommits(_) => Ok(&[]),
        }
    }

    pub fn get_tree_item(&self, config: &ExplorerConfig) -> TreeItem {
        match self {
            ExplorerNode::BranchHistory(node) => node.get_tree_item(config),
            ExplorerNode::Commit(node) => node.get_tree_item(config),
            ExplorerNode::CommitFile(node) => node.get_tree_item(),
            ExplorerNode::ShowAllCommits(node) => node.get_tree_item(),
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        match self {
            ExplorerNode::BranchHistory(node) => NodeRef::Branch {
                name: node.branch.name.clone(),
            },
            ExplorerNode::Commit(node) => NodeRef::Commit {
                sha: node.commit.sha.clone(),
            },
            ExplorerNode::CommitFile(node) => NodeRef::CommitFile {
                sha: node.commit.sha.clone(),
                file_name: node.status.file_name.clone(),
            },
            ExplorerNode::ShowAllCommits(node) => NodeRef::ShowAllCommits {
                branch: node.branch.clone(),
            },
        }
    }

    pub fn view(&self, config: &ExplorerConfig) -> NodeView {
        NodeView {
            node: self.node_ref(),
            item: self.get_tree_item(config),
        }
    }
}

/// Top level of the tree: one history node per branch.
pub async fn root_nodes(
    git: &dyn GitDataSource,
    repo_path: &str,
    config: &ExplorerConfig,
) -> Result<Vec<ExplorerNode>> {
    let branches = git.branches(repo_path).await?;
    Ok(branches
        .into_iter()
        .map(|branch| {
            ExplorerNode::BranchHistory(BranchHistoryNode::new(branch, repo_path, config))
        })
        .collect())
}

/// Command attached to file-level nodes: compare with the previous revision.
pub(crate) fn diff_with_previous_command(commit: Commit) -> TreeCommand {
    TreeCommand {
        title: "Compare File with Previous Revision".to_string(),
        command: CommandId::DiffWithPrevious,
        arguments: TreeCommandArgs::DiffWithPrevious(DiffWithPreviousArgs {
            commit,
            line: Some(0),
            show_options: Some(DisplayOptions {
                preserve_focus: true,
                preview: true,
            }),
        }),
    }
}
