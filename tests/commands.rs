//! End-to-end command and history tree tests over real repositories.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::TestRepo;
use git_revlens::commands::{
    CommandId, CommandResponse, DiffLineWithWorkingArgs, DiffWithPreviousArgs, EditorContext,
    Selection,
    diff_line_with_working, diff_with_previous, report,
};
use git_revlens::config::ExplorerConfig;
use git_revlens::error::{Abort, AppError, Outcome};
use git_revlens::explorer::{self, ExplorerNode, TreeCommandArgs};
use git_revlens::git::{GitDiffRenderer, GitService};
use git_revlens::models::{Commit, CommitKind, LineType, UNCOMMITTED_SHA};

fn setup() -> (Arc<GitService>, GitDiffRenderer) {
    let service = Arc::new(GitService::new(Duration::from_secs(30)));
    let renderer = GitDiffRenderer::new(service.clone());
    (service, renderer)
}

fn editor_at(repo: &TestRepo, file: &str, line: u32) -> EditorContext {
    EditorContext {
        document: Some(repo.path(file).to_string_lossy().to_string()),
        is_dirty: false,
        selection: Selection {
            anchor_line: line,
            active_line: line,
        },
    }
}

#[tokio::test]
async fn diff_line_with_working_compares_blamed_commit() {
    let repo = TestRepo::new();
    repo.commit_file("file.ts", "a\nb\nc\n", "initial");
    let changed = repo.commit_file("file.ts", "a\nB\nc\n", "change b");
    repo.write("file.ts", "a\nB\nc\nlocal\n");
    let (git, renderer) = setup();

    let editor = editor_at(&repo, "file.ts", 1);
    let outcome = diff_line_with_working::execute(
        git.as_ref(),
        &renderer,
        Some(&editor),
        None,
        DiffLineWithWorkingArgs::default(),
    )
    .await
    .unwrap();

    let diff = outcome.done().unwrap();
    assert_eq!(diff.lhs, changed.to_string());
    assert_eq!(diff.rhs, "");
    assert_eq!(diff.new_path, "file.ts");
    assert_eq!(diff.line, 1);
    assert_eq!(diff.stats.insertions, 1);
    assert_eq!(diff.stats.deletions, 0);
    let added: Vec<&str> = diff.hunks[0]
        .lines
        .iter()
        .filter(|l| l.line_type == LineType::Addition)
        .map(|l| l.content.as_str())
        .collect();
    assert_eq!(added, vec!["local\n"]);
}

#[tokio::test]
async fn uncommitted_line_compares_head_with_working_copy() {
    let repo = TestRepo::new();
    let head = repo.commit_file("file.ts", "a\nb\n", "initial");
    repo.write("file.ts", "a\nb\nnew\n");
    let (git, renderer) = setup();

    let editor = editor_at(&repo, "file.ts", 2);
    let diff = diff_line_with_working::execute(
        git.as_ref(),
        &renderer,
        Some(&editor),
        None,
        DiffLineWithWorkingArgs::default(),
    )
    .await
    .unwrap()
    .done()
    .unwrap();

    assert_eq!(diff.lhs, head.to_string());
    assert_eq!(diff.line, 3);
}

#[tokio::test]
async fn dirty_editor_aborts_silently() {
    let repo = TestRepo::new();
    repo.commit_file("file.ts", "a\n", "initial");
    let (git, renderer) = setup();

    let mut editor = editor_at(&repo, "file.ts", 0);
    editor.is_dirty = true;
    let outcome = diff_line_with_working::execute(
        git.as_ref(),
        &renderer,
        Some(&editor),
        None,
        DiffLineWithWorkingArgs::default(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.map(|_| ()), Outcome::Aborted(Abort::DirtyBuffer));
}

#[tokio::test]
async fn newly_added_file_has_nothing_to_compare() {
    let repo = TestRepo::new();
    repo.commit_file("other.txt", "x\n", "initial");
    repo.stage("new.ts", "first\n");
    let (git, renderer) = setup();

    let editor = editor_at(&repo, "new.ts", 0);
    let outcome = diff_line_with_working::execute(
        git.as_ref(),
        &renderer,
        Some(&editor),
        None,
        DiffLineWithWorkingArgs::default(),
    )
    .await
    .unwrap();
    assert_eq!(outcome.map(|_| ()), Outcome::Aborted(Abort::NoPriorHistory));
}

#[tokio::test]
async fn untracked_file_reports_warning() {
    let repo = TestRepo::new();
    repo.commit_file("tracked.txt", "a\n", "initial");
    repo.write("scratch.txt", "b\n");
    let (git, renderer) = setup();

    let editor = editor_at(&repo, "scratch.txt", 0);
    let result = diff_line_with_working::execute(
        git.as_ref(),
        &renderer,
        Some(&editor),
        None,
        DiffLineWithWorkingArgs::default(),
    )
    .await;

    let json = serde_json::to_value(report(CommandId::DiffLineWithWorking, result)).unwrap();
    assert_eq!(json["outcome"], "notice");
    assert_eq!(json["notice"]["level"], "warning");
}

#[tokio::test]
async fn tree_file_command_diffs_with_previous_revision() {
    let repo = TestRepo::new();
    let first = repo.commit_file("src/lib.rs", "one\n", "initial");
    let second = repo.commit_file("src/lib.rs", "two\n", "change");
    let (git, renderer) = setup();
    let config = ExplorerConfig::default();

    let mut roots = explorer::root_nodes(git.as_ref(), &repo.root(), &config).await.unwrap();
    let commits = roots[0].get_children(git.as_ref()).await.unwrap();
    assert_eq!(commits.len(), 2);

    let ExplorerNode::Commit(newest) = &commits[0] else {
        panic!("expected a commit node");
    };
    assert_eq!(newest.commit.sha, second.to_string());

    let mut newest = explorer::CommitNode::new(newest.commit.clone(), None);
    let files = newest.get_children(git.as_ref()).await.unwrap();
    assert_eq!(files.len(), 1);

    let item = files[0].get_tree_item(&config);
    assert_eq!(item.label, "lib.rs  •  src");
    let Some(TreeCommandArgs::DiffWithPrevious(args)) = item.command.map(|c| c.arguments) else {
        panic!("expected a diff command");
    };

    let diff = diff_with_previous::execute(&renderer, args).await.unwrap().done().unwrap();
    assert_eq!(diff.lhs, first.to_string());
    assert_eq!(diff.rhs, second.to_string());
    assert_eq!(diff.stats.insertions, 1);
    assert_eq!(diff.stats.deletions, 1);
}

#[tokio::test]
async fn added_file_has_no_previous_revision() {
    let repo = TestRepo::new();
    let added = repo.commit_file("new.rs", "x\n", "add");
    let (_, renderer) = setup();

    let log_commit = {
        let service = GitService::new(Duration::ZERO);
        let log = service
            .log_for_file(&repo.root(), "new.rs", "HEAD", None)
            .await
            .unwrap()
            .unwrap();
        log.commits[&added.to_string()].clone()
    };

    let args = DiffWithPreviousArgs {
        commit: log_commit,
        line: None,
        show_options: None,
    };
    let result = diff_with_previous::execute(&renderer, args).await;
    let response = report(CommandId::DiffWithPrevious, result);
    assert!(matches!(
        response,
        CommandResponse::Aborted {
            reason: Abort::NoPriorHistory
        }
    ));
}

#[tokio::test]
async fn comparison_cannot_read_files_outside_the_work_tree() {
    let repo = TestRepo::new();
    let head = repo.commit_file("file.ts", "x\n", "initial");
    let outside = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(outside.path(), "x\nsecret\n").unwrap();
    let (_, renderer) = setup();

    let mut commit = Commit::new(
        CommitKind::File,
        repo.root(),
        UNCOMMITTED_SHA,
        outside.path().to_string_lossy(),
        "You",
        Utc::now(),
        "Uncommitted changes",
    );
    commit.previous_sha = Some(head.to_string());
    commit.previous_file_name = Some("file.ts".into());

    let args = DiffWithPreviousArgs {
        commit,
        line: None,
        show_options: None,
    };
    let err = diff_with_previous::execute(&renderer, args).await.unwrap_err();
    match err {
        AppError::GitInvocation { source, .. } => {
            assert!(matches!(*source, AppError::InvalidUri(_)))
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn long_branch_history_ends_with_show_all() {
    let repo = TestRepo::new();
    for i in 0..50 {
        repo.commit_file("file.ts", &format!("{i}\n"), &format!("commit {i}"));
    }
    let (git, _) = setup();
    let config = ExplorerConfig::default();

    let mut roots = explorer::root_nodes(git.as_ref(), &repo.root(), &config).await.unwrap();
    let children = roots[0].get_children(git.as_ref()).await.unwrap();
    assert_eq!(children.len(), 26);
    assert!(matches!(children[25], ExplorerNode::ShowAllCommits(_)));

    let ExplorerNode::BranchHistory(branch) = &mut roots[0] else {
        panic!("expected a branch node");
    };
    branch.show_all();
    let children = branch.get_children(git.as_ref()).await.unwrap();
    assert_eq!(children.len(), 50);
}
