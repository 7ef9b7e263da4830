//! Throwaway repositories for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Repository::init(dir.path()).expect("Failed to init repository");
        Self { dir, repo }
    }

    /// Canonical work tree root, as the service reports it.
    pub fn root(&self) -> String {
        std::fs::canonicalize(self.dir.path())
            .expect("Failed to canonicalize")
            .to_string_lossy()
            .to_string()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        Path::new(&self.root()).join(name)
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create dirs");
        }
        std::fs::write(path, contents).expect("Failed to write file");
    }

    /// Writes `name` and commits it on top of HEAD.
    pub fn commit_file(&self, name: &str, contents: &str, message: &str) -> Oid {
        self.write(name, contents);
        self.commit_paths(&[name], &[], message)
    }

    pub fn commit_paths(&self, add: &[&str], remove: &[&str], message: &str) -> Oid {
        let mut index = self.repo.index().expect("Failed to open index");
        for name in add {
            index.add_path(Path::new(name)).expect("Failed to stage file");
        }
        for name in remove {
            index.remove_path(Path::new(name)).expect("Failed to unstage file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = Signature::now("Test Author", "test@example.com")
            .expect("Failed to create signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit")
    }

    /// Writes `name` and adds it to the index without committing.
    pub fn stage(&self, name: &str, contents: &str) {
        self.write(name, contents);
        let mut index = self.repo.index().expect("Failed to open index");
        index.add_path(Path::new(name)).expect("Failed to stage file");
        index.write().expect("Failed to write index");
    }

    pub fn branch(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        self.repo.branch(name, &head, false).expect("Failed to create branch");
    }
}
